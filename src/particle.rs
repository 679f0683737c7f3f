//! A single simulated ember.
//!
//! Particles are owned by the [`Simulation`](crate::Simulation) collection
//! and updated once per frame. Each carries its own motion state, lifecycle
//! clock, assigned color gradient, and trail history. Hosts read particles
//! (or packed [`ParticleInstance`] records) to render; they never mutate
//! them directly.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::noise::NoiseField;
use crate::settings::{Settings, TrailSettings};

/// Velocity is stored in pixels per 1/60 s tick; integration and speed
/// readouts rescale by this.
pub(crate) const TICK_RATE: f32 = 60.0;

/// Child spawn eligibility window as a fraction of the parent's lifetime.
const CHILD_WINDOW: (f32, f32) = (0.2, 0.8);

/// Outcome of a per-frame particle update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Still alive; snapshot fields are current.
    Alive,
    /// Reached end of life; the caller removes it from the collection.
    Dead,
}

/// One sample of a particle's motion trail, most recent first.
#[derive(Clone, Copy, Debug)]
pub struct TrailPoint {
    pub position: Vec2,
    /// Fades from 1.0 at the head toward 0.0 at the tail.
    pub alpha: f32,
}

/// Packed per-particle render record.
///
/// `#[repr(C)]` with `Pod`/`Zeroable` so hosts can upload a snapshot slice
/// directly as an instance buffer. Trail history is variable length and
/// stays on [`Particle`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub rotation: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    pub glow: f32,
    pub bloom: f32,
    pub trail: f32,
    _pad: f32,
}

/// A single simulated ember.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Position in canvas pixels.
    pub position: Vec2,
    /// Velocity in pixels per 1/60 s tick.
    pub velocity: Vec2,
    /// Age in seconds.
    pub life: f32,
    /// Lifetime in seconds, drawn at spawn.
    pub max_life: f32,
    /// Rendered size in pixels; tracks `initial_size * opacity`.
    pub size: f32,
    /// Size drawn at spawn, before lifecycle scaling.
    pub initial_size: f32,
    /// Color sampled from the assigned gradient at the current life ratio.
    pub color: Vec3,
    /// Opacity sampled from the shared gradient at the current life ratio.
    pub opacity: f32,
    /// Orientation in radians.
    pub rotation: f32,
    /// Signed rotation speed in radians per second.
    pub rotation_speed: f32,
    /// Children spawned so far, capped at `max_children`.
    pub children_spawned: u32,
    /// Per-particle child cap, copied from settings at spawn.
    pub max_children: u32,
    /// Instantaneous speed in pixels per second.
    pub speed: f32,
    /// Speed-gated glow intensity.
    pub glow: f32,
    /// Speed-gated bloom intensity.
    pub bloom: f32,
    /// Normalized 0..1 trail ramp at the current speed.
    pub trail_intensity: f32,
    /// Trail history, most recent sample first.
    pub trail: VecDeque<TrailPoint>,
    /// Mass dividing applied forces. Non-positive mass ignores forces.
    pub mass: f32,
    gradient_index: usize,
    noise_offset: f32,
}

impl Particle {
    /// Spawn a particle at `position` with randomized lifetime, size,
    /// rotation, gradient assignment, and noise phase.
    pub fn spawn(position: Vec2, settings: &Settings, rng: &mut SmallRng) -> Self {
        let particles = &settings.particles;

        // Slight sideways jitter, biased upward
        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * 0.5,
            -rng.gen::<f32>() * 0.5 - 0.2,
        );

        let max_life = particles.lifetime.min + rng.gen::<f32>() * particles.lifetime.extent();

        let size_variation = particles.size.base * particles.size.random_variation;
        let size = particles.size.base - rng.gen::<f32>() * size_variation;

        let rotation_variation = particles.rotation.speed * particles.rotation.random_variation;
        let mut rotation_speed = particles.rotation.speed - rng.gen::<f32>() * rotation_variation;
        if rng.gen::<f32>() < 0.5 {
            rotation_speed = -rotation_speed;
        }

        let gradient_index = rng.gen_range(0..settings.visual.gradients.len());

        Self {
            position,
            velocity,
            life: 0.0,
            max_life,
            size,
            initial_size: size,
            color: settings.visual.gradients[gradient_index].sample(0.0),
            opacity: settings.visual.opacity.sample(0.0),
            rotation: rng.gen::<f32>() * TAU,
            rotation_speed,
            children_spawned: 0,
            max_children: settings.child_spawning.max_children,
            speed: 0.0,
            glow: 0.0,
            bloom: 0.0,
            trail_intensity: 0.0,
            trail: VecDeque::new(),
            mass: 1.0,
            gradient_index,
            noise_offset: rng.gen::<f32>() * 1000.0,
        }
    }

    /// Advance the particle by `dt` seconds.
    ///
    /// Steps in order: age, noise force, drag, upward force, integration,
    /// speed-gated effects, trail maintenance, lifecycle appearance,
    /// rotation. Returns [`UpdateStatus::Dead`] as soon as the particle
    /// exceeds its lifetime; no further state changes happen on that call.
    pub fn update(&mut self, dt: f32, settings: &Settings, noise: &NoiseField) -> UpdateStatus {
        self.life += dt;
        if self.life >= self.max_life {
            return UpdateStatus::Dead;
        }

        // Turbulence, scaled per axis. The per-particle phase offset keeps
        // particles at the same position from moving in lockstep.
        let noise_force = noise.force_at(
            self.position.x,
            self.position.y,
            self.life + self.noise_offset,
        );
        let strength = settings.noise.strength;
        self.velocity.x += noise_force.x * strength.horizontal * dt;
        self.velocity.y += noise_force.y * strength.vertical * dt;

        // Frame-rate independent drag. Applied before the upward force so
        // drag never eats the lift impulse added this frame.
        let drag = settings.particles.drag;
        if drag > 0.0 {
            self.velocity *= (-drag * dt).exp();
        }

        // Screen-space y grows downward, so lift is negative y
        self.velocity.y -= settings.particles.upward_force * dt;

        self.position += self.velocity * dt * TICK_RATE;

        self.speed = self.velocity.length() * TICK_RATE;
        let effects = &settings.visual.effects;
        self.glow = effects.glow.intensity(self.speed);
        self.bloom = effects.bloom.intensity(self.speed);
        self.trail_intensity = effects.trail.intensity(self.speed);

        self.update_trail(&effects.trail);

        let life_ratio = self.life / self.max_life;
        self.color = settings.visual.gradients[self.gradient_index].sample(life_ratio);
        self.opacity = settings.visual.opacity.sample(life_ratio);
        self.size = self.initial_size * self.opacity;

        self.rotation += self.rotation_speed * dt;

        UpdateStatus::Alive
    }

    fn update_trail(&mut self, config: &TrailSettings) {
        if !config.enabled {
            self.trail.clear();
            return;
        }

        self.trail.push_front(TrailPoint {
            position: self.position,
            alpha: 1.0,
        });
        // The target length is 0 below the speed threshold, which wipes
        // the history as the particle slows down.
        self.trail.truncate(config.target_length(self.speed));

        let len = self.trail.len();
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.alpha = 1.0 - (i as f32 / len as f32).powf(config.falloff_exponent);
        }
    }

    /// Accumulate an instantaneous force into velocity, divided by mass.
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        if self.mass > 0.0 {
            self.velocity += force / self.mass;
        }
    }

    /// Attempt to spawn a child particle near this one.
    ///
    /// Children spawn only in the middle of the parent's life, under the
    /// per-parent cap, and pass a per-call Bernoulli trial. The child
    /// inherits a randomized multiple of the parent's velocity.
    pub fn try_spawn_child(&mut self, settings: &Settings, rng: &mut SmallRng) -> Option<Particle> {
        if self.children_spawned >= self.max_children {
            return None;
        }
        let life_ratio = self.life / self.max_life;
        if !(CHILD_WINDOW.0..=CHILD_WINDOW.1).contains(&life_ratio) {
            return None;
        }
        if rng.gen::<f32>() >= settings.child_spawning.probability {
            return None;
        }

        self.children_spawned += 1;

        let offset = 10.0 + rng.gen::<f32>() * 20.0;
        let angle = rng.gen::<f32>() * TAU;
        let child_position = self.position + Vec2::new(angle.cos(), angle.sin()) * offset;

        let mut child = Particle::spawn(child_position, settings, rng);

        let multiplier = &settings.child_spawning.force_multiplier;
        let inherited = multiplier.target + (rng.gen::<f32>() - 0.5) * multiplier.random_range;
        child.velocity = Vec2::new(
            self.velocity.x * inherited + (rng.gen::<f32>() - 0.5) * 0.3,
            self.velocity.y * inherited - rng.gen::<f32>() * 0.2,
        );

        Some(child)
    }

    /// Whether the particle is inside the canvas expanded by `margin`
    /// pixels on every side.
    pub fn is_on_screen(&self, width: f32, height: f32, margin: f32) -> bool {
        self.position.x > -margin
            && self.position.x < width + margin
            && self.position.y > -margin
            && self.position.y < height + margin
    }

    /// Whether the particle has exceeded its lifetime.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life >= self.max_life
    }

    /// Lifecycle progress, 0.0 at spawn approaching 1.0 at death.
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        self.life / self.max_life
    }

    /// Index of the color gradient assigned at spawn.
    #[inline]
    pub fn gradient_index(&self) -> usize {
        self.gradient_index
    }

    /// Pack the renderable state into an instance record.
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            size: self.size,
            rotation: self.rotation,
            color: self.color.to_array(),
            opacity: self.opacity,
            glow: self.glow,
            bloom: self.bloom,
            trail: self.trail_intensity,
            _pad: 0.0,
        }
    }
}
