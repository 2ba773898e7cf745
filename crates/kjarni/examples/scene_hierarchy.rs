//! Entity Hierarchies — solar system demo.
//!
//! Builds a sun with orbiting planets and moons, runs a few frames of an
//! orbit system plus transform propagation, then clones and removes whole
//! subtrees and prints the diagnostics snapshot.
//!
//! Run with: `RUST_LOG=debug cargo run -p kjarni --example scene_hierarchy`

use kjarni::prelude::*;

// ── Orbit component ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Orbit {
    speed: f32,
}

impl Component for Orbit {}

// ── Systems ─────────────────────────────────────────────────────────────

/// Spins every entity with an [`Orbit`] around its parent.
struct OrbitSystem;

impl System for OrbitSystem {
    fn update(&mut self, scene: &mut Scene, dt: f32) {
        let mut pools = scene.pools_mut();
        let Ok((orbits, transforms)) = pools.pair_mut::<Orbit, Transform>() else {
            return;
        };
        for (id, orbit) in orbits.iter_enabled() {
            if let Some(transform) = transforms.try_get_mut(id) {
                let rotation = Quat::from_rotation_z(orbit.speed * dt);
                transform.translation = rotation * transform.translation;
            }
        }
    }
}

fn spawn_planet(scene: &mut Scene, sun: EntityId, name: &str, distance: f32) -> EcsResult<EntityId> {
    let mut planet = scene.new_child(sun, name, EntityCreationFlag::Default)?;
    *planet.get_component_mut::<Transform>()? = Transform::from_xy(distance, 0.0);
    planet.add_component(Orbit { speed: 1.0 / distance })?;

    let mut moon = planet.emplace_back(&format!("{name} moon"))?;
    *moon.get_component_mut::<Transform>()? = Transform::from_xy(distance * 0.1, 0.0);
    moon.add_component(Orbit { speed: 3.0 })?;

    Ok(planet.id())
}

fn print_tree(scene: &Scene) {
    for entity in scene.root().descendants(Traversal::DepthFirst) {
        let position = scene
            .get_component::<GlobalTransform>(entity.id())
            .map(|global| global.translation())
            .unwrap_or(Vec3::ZERO);
        println!(
            "{:indent$}{} [{}] at ({:.1}, {:.1})",
            "",
            entity.name(),
            entity.id(),
            position.x,
            position.y,
            indent = entity.depth() * 2
        );
    }
}

fn main() -> EcsResult<()> {
    kjarni::diag::init_logger();

    let mut scene = Scene::with_config(SceneConfig::default().with_root_name("solar system"));
    let sun = scene.new_entity("sun", EntityCreationFlag::Default)?.id();
    let earth = spawn_planet(&mut scene, sun, "earth", 100.0)?;
    spawn_planet(&mut scene, sun, "mars", 150.0)?;

    scene.emplace_system(OrbitSystem);
    scene.emplace_system(TransformPropagation);

    for _ in 0..60 {
        scene.tick(1.0 / 60.0);
    }
    println!("after {} frames:", scene.frame_count());
    print_tree(&scene);

    let copy = scene.clone_entity(earth, Some(sun))?;
    log::info!("cloned earth as {copy}");
    let removed = scene.remove_entity(earth)?;
    log::info!("removed earth and {} descendants", removed - 1);

    scene.tick(1.0 / 60.0);
    println!("after clone + remove:");
    print_tree(&scene);

    #[cfg(feature = "diagnostics")]
    {
        match scene.diagnostics_snapshot().to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(err) => log::warn!("snapshot failed: {err}"),
        }
    }

    Ok(())
}
