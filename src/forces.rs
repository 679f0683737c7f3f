//! Pointer and region forces.
//!
//! Forces are applied directly to particle velocities the instant a host
//! reports a pointer event, outside the fixed per-frame update. Each
//! variant of [`Force`] is a self-contained solver over the particle
//! collection.
//!
//! # Force Kinds
//!
//! - **Point**: Radial, Suction, Directional
//! - **Motion-driven**: Sweep, Follow (need a [`PointerMotion`] sample)
//! - **Flocking**: Boids (the one O(n²) solver)
//! - **Region**: OverlayRepulsion (rectangle, not a point)
//!
//! Every solver shares the same edge policy: zero radius, zero pointer
//! speed, or a particle sitting exactly on the force origin all resolve to
//! an early return, never a division by zero.
//!
//! # Example
//!
//! ```ignore
//! let force = Force::Radial {
//!     position: Vec2::new(400.0, 300.0),
//!     strength: 150.0,
//!     radius: 100.0,
//!     falloff_curve: 2.0,
//! };
//! force.apply(sim.particles_mut());
//! ```

use glam::Vec2;

use crate::particle::{Particle, TICK_RATE};
use crate::settings::{ForceKind, OverlayRepulsionSettings, Settings};

/// Scales raw strength values into velocity units so hand-friendly
/// settings in the 0..500 range produce stable motion.
const FORCE_SCALE: f32 = 0.01;

/// Overlay pushes are gentler than point forces.
const OVERLAY_SCALE: f32 = 0.02;

/// Minimum pointer speed (px/s) for the sweep force to engage.
const SWEEP_MIN_SPEED: f32 = 1.0;

/// A pointer velocity sample accompanying motion-driven forces.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerMotion {
    /// Pointer velocity in pixels per second.
    pub velocity: Vec2,
    /// Pointer speed in pixels per second.
    pub speed: f32,
}

impl PointerMotion {
    /// Build a motion sample from a velocity vector.
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            speed: velocity.length(),
        }
    }

    /// A stationary pointer. Motion-driven forces treat this as a no-op.
    pub fn still() -> Self {
        Self::default()
    }
}

/// An axis-aligned overlay rectangle in canvas pixels.
#[derive(Clone, Copy, Debug)]
pub struct RepulsionRegion {
    /// Top-left corner.
    pub position: Vec2,
    pub size: Vec2,
}

impl RepulsionRegion {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }
}

/// A force a host applies to the particle collection.
///
/// Construct a variant directly, or derive the settings-selected pointer
/// variant with [`Force::from_settings`]. Applying a force mutates
/// particle velocities immediately; it is not integrated through the
/// lifecycle update.
#[derive(Clone, Copy, Debug)]
pub enum Force {
    /// Push particles away from a point.
    ///
    /// # Parameters
    ///
    /// - `strength` - Raw force strength (typical: 50 to 300)
    /// - `radius` - Radius of effect in pixels
    /// - `falloff_curve` - Exponent shaping decay toward the edge
    Radial {
        position: Vec2,
        strength: f32,
        radius: f32,
        falloff_curve: f32,
    },

    /// Pull particles toward a point. Same law as [`Force::Radial`] with
    /// the direction reversed.
    Suction {
        position: Vec2,
        strength: f32,
        radius: f32,
        falloff_curve: f32,
    },

    /// Push every particle within the radius to the right at constant
    /// strength, with no falloff. A deliberately simple policy.
    Directional {
        position: Vec2,
        strength: f32,
        radius: f32,
    },

    /// Push particles along the pointer's travel, strongest for particles
    /// straight ahead of the motion. Produces a wake trailing fast pointer
    /// movement. Engages only above a minimum pointer speed.
    ///
    /// # Parameters
    ///
    /// - `speed_multiplier` - Scales the motion-aligned push
    /// - `directional_spread` - 0 = tight beam, 1 = wide wake
    Sweep {
        position: Vec2,
        motion: PointerMotion,
        strength: f32,
        radius: f32,
        falloff_curve: f32,
        speed_multiplier: f32,
        directional_spread: f32,
    },

    /// Drag particles along behind a moving pointer, optionally pulling
    /// them toward it. Stationary pointers apply nothing.
    ///
    /// # Parameters
    ///
    /// - `spread` - 0 = only particles behind the motion, 1 = uniform
    /// - `follow_strength` - Scales the along-motion drag
    /// - `suction_strength` - Optional pull toward the pointer; 0 disables
    Follow {
        position: Vec2,
        motion: PointerMotion,
        strength: f32,
        radius: f32,
        falloff_curve: f32,
        spread: f32,
        follow_strength: f32,
        suction_strength: f32,
    },

    /// Flocking around the pointer: separation from close neighbors,
    /// alignment with neighbor headings, cohesion toward the pointer.
    ///
    /// Scans all particle pairs within the radius, so cost is O(n²) over
    /// the affected set. A `speed_limit` of zero disables the solver.
    ///
    /// # Parameters
    ///
    /// - `speed_limit` - Max particle speed under influence, px/s
    /// - `separation`, `alignment`, `cohesion` - Per-behavior weights
    Boids {
        position: Vec2,
        radius: f32,
        falloff_curve: f32,
        speed_limit: f32,
        separation: f32,
        alignment: f32,
        cohesion: f32,
    },

    /// Push particles out of a padded rectangular region, away from its
    /// center. Falloff is normalized by the padded region's half-diagonal.
    OverlayRepulsion {
        region: RepulsionRegion,
        force_multiplier: f32,
        padding: f32,
        falloff_curve: f32,
    },
}

impl Force {
    /// Build the pointer force selected by `settings.pointer.force_kind`.
    ///
    /// `motion` is only read by the motion-driven kinds; pass
    /// [`PointerMotion::still`] when no velocity sample is available.
    pub fn from_settings(position: Vec2, motion: PointerMotion, settings: &Settings) -> Self {
        let pointer = &settings.pointer;
        match pointer.force_kind {
            ForceKind::Radial => Force::Radial {
                position,
                strength: pointer.strength,
                radius: pointer.radius,
                falloff_curve: pointer.falloff_curve,
            },
            ForceKind::Suction => Force::Suction {
                position,
                strength: pointer.strength,
                radius: pointer.radius,
                falloff_curve: pointer.falloff_curve,
            },
            ForceKind::Directional => Force::Directional {
                position,
                strength: pointer.strength,
                radius: pointer.radius,
            },
            ForceKind::Sweep => Force::Sweep {
                position,
                motion,
                strength: pointer.strength,
                radius: pointer.radius,
                falloff_curve: pointer.falloff_curve,
                speed_multiplier: pointer.sweep.speed_multiplier,
                directional_spread: pointer.sweep.directional_spread,
            },
            ForceKind::Follow => Force::Follow {
                position,
                motion,
                strength: pointer.strength,
                radius: pointer.radius,
                falloff_curve: pointer.falloff_curve,
                spread: pointer.follow.spread,
                follow_strength: pointer.follow.strength,
                suction_strength: pointer.follow.suction_strength,
            },
            ForceKind::Boids => Force::Boids {
                position,
                radius: pointer.radius,
                falloff_curve: pointer.falloff_curve,
                speed_limit: pointer.boids.speed_limit,
                separation: pointer.boids.separation,
                alignment: pointer.boids.alignment,
                cohesion: pointer.boids.cohesion,
            },
        }
    }

    /// Build an overlay repulsion force for `region` from settings.
    pub fn overlay(region: RepulsionRegion, settings: &OverlayRepulsionSettings) -> Self {
        Force::OverlayRepulsion {
            region,
            force_multiplier: settings.force_multiplier,
            padding: settings.padding,
            falloff_curve: settings.falloff_curve,
        }
    }

    /// Apply this force to every particle in the slice.
    pub fn apply(&self, particles: &mut [Particle]) {
        match *self {
            Force::Radial {
                position,
                strength,
                radius,
                falloff_curve,
            } => apply_point(particles, position, strength, radius, falloff_curve, false),
            Force::Suction {
                position,
                strength,
                radius,
                falloff_curve,
            } => apply_point(particles, position, strength, radius, falloff_curve, true),
            Force::Directional {
                position,
                strength,
                radius,
            } => apply_directional(particles, position, strength, radius),
            Force::Sweep {
                position,
                motion,
                strength,
                radius,
                falloff_curve,
                speed_multiplier,
                directional_spread,
            } => apply_sweep(
                particles,
                position,
                motion,
                strength,
                radius,
                falloff_curve,
                speed_multiplier,
                directional_spread,
            ),
            Force::Follow {
                position,
                motion,
                strength,
                radius,
                falloff_curve,
                spread,
                follow_strength,
                suction_strength,
            } => apply_follow(
                particles,
                position,
                motion,
                strength,
                radius,
                falloff_curve,
                spread,
                follow_strength,
                suction_strength,
            ),
            Force::Boids {
                position,
                radius,
                falloff_curve,
                speed_limit,
                separation,
                alignment,
                cohesion,
            } => apply_boids(
                particles,
                position,
                radius,
                falloff_curve,
                speed_limit,
                separation,
                alignment,
                cohesion,
            ),
            Force::OverlayRepulsion {
                region,
                force_multiplier,
                padding,
                falloff_curve,
            } => apply_overlay(particles, region, force_multiplier, padding, falloff_curve),
        }
    }
}

/// Shared falloff law: `(1 - distance/radius)^curve`, zero at and beyond
/// the radius, zero for degenerate radii.
fn falloff(distance: f32, radius: f32, curve: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    (1.0 - distance / radius).powf(curve)
}

fn apply_point(
    particles: &mut [Particle],
    position: Vec2,
    strength: f32,
    radius: f32,
    curve: f32,
    toward: bool,
) {
    for particle in particles {
        let delta = particle.position - position;
        let distance = delta.length();
        if distance == 0.0 {
            continue;
        }
        let weight = falloff(distance, radius, curve);
        if weight == 0.0 {
            continue;
        }
        let mut direction = delta / distance;
        if toward {
            direction = -direction;
        }
        particle.apply_force(direction * (strength * weight * FORCE_SCALE));
    }
}

fn apply_directional(particles: &mut [Particle], position: Vec2, strength: f32, radius: f32) {
    if radius <= 0.0 {
        return;
    }
    let force = Vec2::new(strength * FORCE_SCALE, 0.0);
    for particle in particles {
        if particle.position.distance(position) < radius {
            particle.apply_force(force);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_sweep(
    particles: &mut [Particle],
    position: Vec2,
    motion: PointerMotion,
    strength: f32,
    radius: f32,
    curve: f32,
    speed_multiplier: f32,
    directional_spread: f32,
) {
    if motion.speed < SWEEP_MIN_SPEED {
        return;
    }
    let motion_dir = motion.velocity / motion.speed;
    // Low spread sharpens the alignment exponent into a tight beam
    let focus = 1.0 / (directional_spread + 0.1);

    for particle in particles {
        let delta = particle.position - position;
        let distance = delta.length();
        if distance == 0.0 {
            continue;
        }
        let weight = falloff(distance, radius, curve);
        if weight == 0.0 {
            continue;
        }
        let radial_dir = delta / distance;

        let alignment = radial_dir.dot(motion_dir).max(0.0);
        let directional = motion.speed * speed_multiplier * alignment.powf(focus);
        let force = radial_dir * (strength * weight) + motion_dir * (directional * weight);
        particle.apply_force(force * FORCE_SCALE);
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_follow(
    particles: &mut [Particle],
    position: Vec2,
    motion: PointerMotion,
    strength: f32,
    radius: f32,
    curve: f32,
    spread: f32,
    follow_strength: f32,
    suction_strength: f32,
) {
    if motion.speed <= 0.0 {
        return;
    }
    let motion_dir = motion.velocity / motion.speed;
    let spread = spread.clamp(0.0, 1.0);
    let follow_strength = follow_strength.max(0.0);
    let suction_strength = suction_strength.max(0.0);
    // Follow magnitude never exceeds the pointer's own speed
    let follow_mag = (motion.speed * strength).min(motion.speed) * follow_strength * FORCE_SCALE;

    for particle in particles {
        let delta = particle.position - position;
        let distance = delta.length();
        if distance == 0.0 {
            continue;
        }
        let weight = falloff(distance, radius, curve);
        if weight == 0.0 {
            continue;
        }
        let radial_dir = delta / distance;

        // Particles behind the motion vector are dragged hardest; spread=1
        // flattens the weighting to uniform.
        let behind = radial_dir.dot(-motion_dir).max(0.0);
        let spread_weight = spread + (1.0 - spread) * behind;

        let mut force = motion_dir * (follow_mag * weight * spread_weight);
        if suction_strength > 0.0 {
            force -= radial_dir * (suction_strength * weight * FORCE_SCALE);
        }
        particle.apply_force(force);
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_boids(
    particles: &mut [Particle],
    position: Vec2,
    radius: f32,
    curve: f32,
    speed_limit: f32,
    separation: f32,
    alignment: f32,
    cohesion: f32,
) {
    if speed_limit <= 0.0 || radius <= 0.0 {
        return;
    }
    let neighbor_radius = (radius * 0.5).max(10.0);
    let separation_radius = (neighbor_radius * 0.5).max(5.0);
    let separation_weight = separation.max(0.0);
    let alignment_weight = alignment.max(0.0);
    let cohesion_weight = cohesion.max(0.0);
    // Velocity is stored in px per tick, so convert the px/s limit
    let max_velocity = speed_limit / TICK_RATE;
    let max_steer = max_velocity * 0.15;

    // Steering is computed against a coherent pre-application snapshot,
    // then applied in a second pass.
    let mut steering: Vec<(usize, Vec2)> = Vec::new();
    for (i, particle) in particles.iter().enumerate() {
        let delta = particle.position - position;
        let distance = delta.length();
        if distance == 0.0 || distance > radius {
            continue;
        }

        let mut separation_sum = Vec2::ZERO;
        let mut velocity_sum = Vec2::ZERO;
        let mut neighbor_count = 0u32;
        for (j, other) in particles.iter().enumerate() {
            if i == j {
                continue;
            }
            let offset = other.position - particle.position;
            let d = offset.length();
            if d <= 0.0 || d > neighbor_radius {
                continue;
            }
            neighbor_count += 1;
            velocity_sum += other.velocity;
            if d < separation_radius {
                // Inverse-distance push away from the close neighbor
                separation_sum -= (offset / d) * ((separation_radius - d) / separation_radius);
            }
        }

        let mut desired_separation = Vec2::ZERO;
        if separation_sum.length_squared() > 0.0 {
            desired_separation = separation_sum.normalize() * max_velocity;
        }
        let mut desired_alignment = Vec2::ZERO;
        if neighbor_count > 0 {
            let average = velocity_sum / neighbor_count as f32;
            if average.length_squared() > 0.0 {
                desired_alignment = average.normalize() * max_velocity;
            }
        }
        // Cohesion steers toward the pointer itself
        let desired_cohesion = (-delta / distance) * max_velocity;

        // Each term is desired-minus-current, so a zero desired vector
        // still brakes the particle under that behavior's weight.
        let mut steer = Vec2::ZERO;
        steer += (desired_separation - particle.velocity) * separation_weight;
        steer += (desired_alignment - particle.velocity) * alignment_weight;
        steer += (desired_cohesion - particle.velocity) * cohesion_weight;

        steer *= falloff(distance, radius, curve);
        steering.push((i, steer.clamp_length_max(max_steer)));
    }

    for (i, steer) in steering {
        let particle = &mut particles[i];
        particle.apply_force(steer);
        particle.velocity = particle.velocity.clamp_length_max(max_velocity);
    }
}

fn apply_overlay(
    particles: &mut [Particle],
    region: RepulsionRegion,
    force_multiplier: f32,
    padding: f32,
    curve: f32,
) {
    let min = region.position - Vec2::splat(padding);
    let max = region.position + region.size + Vec2::splat(padding);
    let center = (min + max) * 0.5;
    let max_radius = ((max - min) * 0.5).length();
    if max_radius <= 0.0 {
        return;
    }

    for particle in particles {
        let p = particle.position;
        if p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y {
            continue;
        }
        let delta = p - center;
        let distance = delta.length();
        if distance == 0.0 {
            continue;
        }
        let normalized = (distance / max_radius).min(1.0);
        let weight = (1.0 - normalized).powf(curve);
        particle.apply_force((delta / distance) * (force_multiplier * weight * OVERLAY_SCALE));
    }
}
