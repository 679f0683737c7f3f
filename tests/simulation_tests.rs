//! Integration tests for the simulation loop.
//!
//! These tests drive whole frames through the public API: spawning,
//! lifetime, culling, pointer forces, child spawning, and settings swaps.

use embersim::{
    ForceKind, PointerMotion, RepulsionRegion, SettingValue, Settings, Simulation, Vec2,
};

/// Settings with no ambient spawning, turbulence, drag, lift, or child
/// spawning: motion comes only from spawn velocities and explicit forces.
fn quiet_settings() -> Settings {
    let mut settings = Settings::default();
    settings.particles.spawn_rate = 0.0;
    settings.particles.upward_force = 0.0;
    settings.particles.drag = 0.0;
    settings.noise.strength.horizontal = 0.0;
    settings.noise.strength.vertical = 0.0;
    settings.child_spawning.probability = 0.0;
    settings
}

/// Advance by 1/32 s steps; 32 of them are exactly one second with no
/// accumulator drift.
fn step(sim: &mut Simulation, updates: usize) {
    for _ in 0..updates {
        sim.update(0.03125);
    }
}

fn mean_distance_from(sim: &Simulation, point: Vec2) -> f32 {
    let total: f32 = sim
        .particles()
        .iter()
        .map(|p| p.position.distance(point))
        .sum();
    total / sim.particle_count() as f32
}

// ============================================================================
// Population and Spawning
// ============================================================================

#[test]
fn test_population_respects_ceiling_under_heavy_spawn() {
    let mut settings = Settings::default();
    settings.particles.max_count = 50;
    settings.particles.spawn_rate = 500.0;
    let mut sim = Simulation::new(settings).with_seed(7);

    for _ in 0..96 {
        sim.update(0.03125);
        assert!(sim.particle_count() <= 50);
    }
    assert_eq!(sim.particle_count(), 50);
}

#[test]
fn test_ambient_spawns_land_in_spawn_region() {
    // Default region is x in 10%..90%, y in 70%..90% of an 800x600 canvas
    let mut sim = Simulation::new(Settings::default()).with_seed(7);
    sim.update(0.03125);

    assert!(sim.particle_count() > 0);
    // One frame of drift stays within a few pixels
    for particle in sim.particles() {
        assert!(particle.position.x >= 75.0 && particle.position.x <= 725.0);
        assert!(particle.position.y >= 415.0 && particle.position.y <= 545.0);
    }
}

#[test]
fn test_held_pointer_spawning_follows_the_pointer() {
    let mut settings = quiet_settings();
    settings.pointer.click_spawn_count = 4;
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.start_pointer_spawn(Vec2::new(100.0, 300.0));
    step(&mut sim, 16);
    sim.move_pointer_spawn(Vec2::new(700.0, 300.0));
    step(&mut sim, 16);

    assert_eq!(sim.particle_count(), 4);
    let near_start = sim.particles().iter().filter(|p| p.position.x < 400.0).count();
    let near_end = sim.particles().iter().filter(|p| p.position.x > 400.0).count();
    assert_eq!(near_start, 2);
    assert_eq!(near_end, 2);
}

// ============================================================================
// Lifetime and Culling
// ============================================================================

#[test]
fn test_particles_die_after_lifetime() {
    let mut settings = quiet_settings();
    settings.particles.lifetime = embersim::settings::Span::new(0.5, 0.5);
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.spawn_at(Vec2::new(400.0, 300.0), 10);
    assert_eq!(sim.particle_count(), 10);

    step(&mut sim, 64);
    assert_eq!(sim.particle_count(), 0);
}

#[test]
fn test_coarse_timestep_advances_full_lifetime() {
    // Fixed-timestep hosts step far coarser than a render frame; 40 steps
    // of 1/8 s must integrate to the full 5 s lifetime, not less. The tall
    // canvas keeps the rising particle inside the cull margin so removal
    // can only come from its lifetime.
    let mut settings = quiet_settings();
    settings.particles.lifetime = embersim::settings::Span::new(5.0, 5.0);
    settings.particles.upward_force = 1.0;
    let mut sim = Simulation::new(settings)
        .with_seed(7)
        .with_canvas_size(800.0, 4000.0);

    sim.spawn_at(Vec2::new(400.0, 3500.0), 1);
    let mut last_y = sim.particles()[0].position.y;

    for _ in 0..39 {
        sim.update(0.125);
        let y = sim.particles()[0].position.y;
        assert!(y < last_y);
        last_y = y;
    }
    // Alive at t = 4.875 s, removed by the call that reaches t = 5.0 s
    assert_eq!(sim.particle_count(), 1);
    sim.update(0.125);
    assert_eq!(sim.particle_count(), 0);
}

#[test]
fn test_particles_rise_monotonically() {
    let mut settings = quiet_settings();
    settings.particles.upward_force = 1.0;
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.spawn_at(Vec2::new(400.0, 300.0), 1);
    let mut last_y = sim.particles()[0].position.y;

    for _ in 0..30 {
        sim.update(0.03125);
        let y = sim.particles()[0].position.y;
        assert!(y < last_y);
        last_y = y;
    }
}

#[test]
fn test_fast_particles_are_culled_off_screen() {
    let mut sim = Simulation::new(quiet_settings()).with_seed(7);
    sim.spawn_at(Vec2::new(400.0, 300.0), 1);

    // ~940 px per update; past the 200 px margin after one step
    sim.particles_mut()[0].velocity = Vec2::new(0.0, -500.0);
    step(&mut sim, 2);

    assert_eq!(sim.particle_count(), 0);
}

// ============================================================================
// Pointer Forces
// ============================================================================

#[test]
fn test_radial_force_disperses_cluster() {
    let mut sim = Simulation::new(quiet_settings()).with_seed(7);
    let center = Vec2::new(400.0, 300.0);
    sim.spawn_at(center, 12);
    for particle in sim.particles_mut() {
        particle.velocity = Vec2::ZERO;
    }
    let before = mean_distance_from(&sim, center);

    // A held pointer re-applies its force every frame
    for _ in 0..10 {
        sim.apply_pointer_force(center, PointerMotion::still());
        sim.update(0.03125);
    }

    assert!(mean_distance_from(&sim, center) > before);
}

#[test]
fn test_force_at_particle_position_is_safe() {
    let kinds = [
        ForceKind::Radial,
        ForceKind::Suction,
        ForceKind::Directional,
        ForceKind::Sweep,
        ForceKind::Follow,
        ForceKind::Boids,
    ];
    let pointer = Vec2::new(400.0, 300.0);

    for kind in kinds {
        let mut settings = quiet_settings();
        settings.pointer.force_kind = kind;
        let mut sim = Simulation::new(settings).with_seed(7);
        sim.spawn_at(pointer, 1);
        sim.particles_mut()[0].position = pointer;
        sim.particles_mut()[0].velocity = Vec2::ZERO;

        sim.apply_pointer_force(pointer, PointerMotion::new(Vec2::new(120.0, 0.0)));
        sim.update(0.03125);

        let particle = &sim.particles()[0];
        assert!(particle.position.is_finite(), "{kind:?} produced a non-finite position");
        assert!(particle.velocity.is_finite(), "{kind:?} produced a non-finite velocity");
    }
}

#[test]
fn test_boids_zero_speed_limit_is_inert() {
    let mut settings = quiet_settings();
    settings.pointer.force_kind = ForceKind::Boids;
    settings.pointer.boids.speed_limit = 0.0;
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.spawn_at(Vec2::new(400.0, 300.0), 8);
    let before: Vec<Vec2> = sim.particles().iter().map(|p| p.velocity).collect();

    sim.apply_pointer_force(Vec2::new(410.0, 300.0), PointerMotion::still());

    let after: Vec<Vec2> = sim.particles().iter().map(|p| p.velocity).collect();
    assert_eq!(before, after);
}

#[test]
fn test_overlay_repulsion_clears_region() {
    let mut sim = Simulation::new(quiet_settings()).with_seed(7);
    let region = RepulsionRegion::new(Vec2::new(300.0, 200.0), Vec2::new(200.0, 200.0));
    let region_center = Vec2::new(400.0, 300.0);

    sim.spawn_at(region_center, 10);
    for particle in sim.particles_mut() {
        particle.velocity = Vec2::ZERO;
    }
    let before = mean_distance_from(&sim, region_center);

    for _ in 0..60 {
        sim.apply_overlay_repulsion(region);
        sim.update(0.03125);
    }

    assert!(mean_distance_from(&sim, region_center) > before);
}

// ============================================================================
// Child Spawning
// ============================================================================

#[test]
fn test_child_cap_zero_blocks_offspring() {
    let mut settings = quiet_settings();
    settings.child_spawning.probability = 1.0;
    settings.child_spawning.max_children = 0;
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.spawn_at(Vec2::new(400.0, 300.0), 5);
    // 1.5 s: well inside every lifetime, well past the child window start
    step(&mut sim, 48);

    assert_eq!(sim.particle_count(), 5);
}

#[test]
fn test_children_grow_population() {
    let mut settings = quiet_settings();
    settings.child_spawning.probability = 1.0;
    settings.child_spawning.max_children = 2;
    let mut sim = Simulation::new(settings).with_seed(7);

    sim.spawn_at(Vec2::new(400.0, 300.0), 5);
    step(&mut sim, 64);

    assert!(sim.particle_count() > 5);
    assert!(sim.particle_count() <= sim.settings().particles.max_count);
}

// ============================================================================
// Settings and Snapshots
// ============================================================================

#[test]
fn test_settings_swap_changes_behavior() {
    let mut sim = Simulation::new(quiet_settings()).with_seed(7);
    step(&mut sim, 32);
    assert_eq!(sim.particle_count(), 0);

    let mut busy = quiet_settings();
    busy.particles.spawn_rate = 50.0;
    sim.update_settings(busy);
    step(&mut sim, 32);

    assert!(sim.particle_count() > 0);
}

#[test]
fn test_config_store_drives_simulation() {
    let config = embersim::ConfigStore::default();
    assert_eq!(
        config.get("particles.max_count").unwrap(),
        SettingValue::Number(1000.0)
    );

    let mut sim = Simulation::new(config.snapshot()).with_seed(7);
    sim.update(0.03125);
    assert!(sim.particle_count() > 0);
}

#[test]
fn test_instance_records_mirror_particles() {
    let mut sim = Simulation::new(quiet_settings()).with_seed(7);
    sim.spawn_at(Vec2::new(400.0, 300.0), 6);
    sim.update(0.03125);

    let mut instances = Vec::new();
    sim.write_instances(&mut instances);
    assert_eq!(instances.len(), sim.particle_count());

    for (instance, particle) in instances.iter().zip(sim.particles()) {
        assert_eq!(instance.position, particle.position.to_array());
        assert!(instance.size > 0.0);
        assert!((0.0..=1.0).contains(&instance.opacity));
        // Spawn velocities are far below the glow and bloom thresholds
        assert_eq!(instance.glow, 0.0);
        assert_eq!(instance.bloom, 0.0);
    }
}
