//! Simulation manager owning the particle collection.
//!
//! [`Simulation`] drives one frame at a time: ambient and pointer-held
//! spawning, per-particle updates, culling of dead or far off-screen
//! particles, and probabilistic child spawning. Pointer forces are applied
//! immediately as events arrive, outside the fixed update step.
//!
//! # Quick Start
//!
//! ```ignore
//! let mut sim = Simulation::new(Settings::default())
//!     .with_canvas_size(1280.0, 720.0);
//!
//! // Per animation frame:
//! sim.update(delta_seconds);
//! renderer.draw(sim.particles());
//!
//! // On pointer events:
//! sim.apply_pointer_force(cursor, PointerMotion::new(cursor_velocity));
//! ```

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::forces::{Force, PointerMotion, RepulsionRegion};
use crate::noise::NoiseField;
use crate::particle::{Particle, ParticleInstance, UpdateStatus};
use crate::settings::Settings;

/// Ambient spawning is tuned as 25 particles/sec per 1200 px of canvas
/// width, before the settings multiplier.
const AMBIENT_RATE_PER_PX: f32 = 25.0 / 1200.0;

/// Particles further off-screen than this many pixels are culled.
const CULL_MARGIN: f32 = 200.0;

/// Canvas size assumed before the host reports one.
const DEFAULT_CANVAS_WIDTH: f32 = 800.0;
const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;

/// The particle simulation.
///
/// Owns the particle collection, the noise field, and the active settings
/// snapshot. Single-threaded: the host calls [`update`](Self::update) once
/// per frame and force/spawn methods between frames.
pub struct Simulation {
    particles: Vec<Particle>,
    noise: NoiseField,
    settings: Settings,
    rng: SmallRng,
    canvas_width: f32,
    canvas_height: f32,
    spawn_accumulator: f32,
    pointer_spawn_accumulator: f32,
    pointer_spawn: Option<Vec2>,
}

impl Simulation {
    /// Create a simulation with the given settings.
    ///
    /// The RNG is seeded from the wall clock; use
    /// [`with_seed`](Self::with_seed) for reproducible runs.
    pub fn new(settings: Settings) -> Self {
        // Different each program execution
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);

        if let Err(error) = settings.validate() {
            warn!(%error, "settings failed validation");
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let noise = NoiseField::new(rng.gen(), settings.noise);

        Self {
            particles: Vec::new(),
            noise,
            settings,
            rng,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            spawn_accumulator: 0.0,
            pointer_spawn_accumulator: 0.0,
            pointer_spawn: None,
        }
    }

    /// Use a fixed RNG seed. Spawning and the noise field become
    /// reproducible given the same seed and call sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self.noise = NoiseField::new(self.rng.gen(), self.settings.noise);
        self
    }

    /// Set the canvas size at construction, without rescaling.
    pub fn with_canvas_size(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    // ========== Frame loop ==========

    /// Advance the simulation by `dt` seconds.
    ///
    /// Spawns ambient and pointer-held particles, updates every particle,
    /// removes dead and far off-screen ones, then attempts child spawns.
    /// `dt` is integrated as given apart from a floor at zero; clamping
    /// render-loop frame gaps is the host's job, see [`Time`](crate::Time).
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        self.spawn_accumulator += dt;
        self.pointer_spawn_accumulator += dt;

        self.spawn_ambient();
        self.spawn_pointer_held();
        self.update_particles(dt);
        self.spawn_children();
    }

    /// Ambient spawning, rate-limited relative to canvas width so visual
    /// density holds roughly constant across screen sizes.
    fn spawn_ambient(&mut self) {
        let rate = self.canvas_width * AMBIENT_RATE_PER_PX * self.settings.particles.spawn_rate;
        if rate <= 0.0 {
            self.spawn_accumulator = 0.0;
            return;
        }
        let interval = 1.0 / rate;

        while self.spawn_accumulator >= interval {
            if self.particles.len() >= self.settings.particles.max_count {
                break;
            }
            let area = self.settings.particles.spawn_area;
            let x = self.canvas_width * (area.x.min + self.rng.gen::<f32>() * area.x.extent());
            let y = self.canvas_height * (area.y.min + self.rng.gen::<f32>() * area.y.extent());

            let particle = Particle::spawn(Vec2::new(x, y), &self.settings, &mut self.rng);
            self.particles.push(particle);
            self.spawn_accumulator -= interval;
        }
    }

    fn spawn_pointer_held(&mut self) {
        let position = match self.pointer_spawn {
            Some(position) => position,
            None => return,
        };
        let rate = self.settings.pointer.click_spawn_count as f32;
        if rate <= 0.0 {
            self.pointer_spawn_accumulator = 0.0;
            return;
        }
        let interval = 1.0 / rate;

        while self.pointer_spawn_accumulator >= interval {
            if self.particles.len() >= self.settings.particles.max_count {
                break;
            }
            self.spawn_at(position, 1);
            self.pointer_spawn_accumulator -= interval;
        }
    }

    fn update_particles(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let status = self.particles[i].update(dt, &self.settings, &self.noise);
            let keep = status == UpdateStatus::Alive
                && self.particles[i].is_on_screen(
                    self.canvas_width,
                    self.canvas_height,
                    CULL_MARGIN,
                );
            if keep {
                i += 1;
            } else {
                // Order within the collection carries no meaning
                self.particles.swap_remove(i);
            }
        }
    }

    fn spawn_children(&mut self) {
        let max_count = self.settings.particles.max_count;
        let mut children = Vec::new();
        for i in 0..self.particles.len() {
            // Checked before each attempt so the parent's child counter is
            // only consumed when the child will actually be added.
            if self.particles.len() + children.len() >= max_count {
                break;
            }
            if let Some(child) = self.particles[i].try_spawn_child(&self.settings, &mut self.rng) {
                children.push(child);
            }
        }
        self.particles.append(&mut children);
    }

    // ========== Spawning ==========

    /// Spawn up to `count` particles jittered around `position`, each with
    /// an extra upward kick. Stops early at the population cap. Returns
    /// the particles just spawned.
    pub fn spawn_at(&mut self, position: Vec2, count: usize) -> &[Particle] {
        let start = self.particles.len();
        for _ in 0..count {
            if self.particles.len() >= self.settings.particles.max_count {
                break;
            }
            let jitter = Vec2::new(
                (self.rng.gen::<f32>() - 0.5) * 20.0,
                (self.rng.gen::<f32>() - 0.5) * 20.0,
            );
            let mut particle = Particle::spawn(position + jitter, &self.settings, &mut self.rng);
            particle.velocity.y -= 0.3;
            self.particles.push(particle);
        }
        &self.particles[start..]
    }

    /// Begin continuous spawning at the pointer position.
    ///
    /// The pacing accumulator resets so held-pointer spawning starts a
    /// fresh interval rather than bursting from stale accumulated time.
    pub fn start_pointer_spawn(&mut self, position: Vec2) {
        self.pointer_spawn = Some(position);
        self.pointer_spawn_accumulator = 0.0;
    }

    /// Move the continuous spawn source. Does nothing when not spawning.
    pub fn move_pointer_spawn(&mut self, position: Vec2) {
        if let Some(p) = self.pointer_spawn.as_mut() {
            *p = position;
        }
    }

    /// Stop continuous pointer spawning.
    pub fn stop_pointer_spawn(&mut self) {
        self.pointer_spawn = None;
    }

    // ========== Forces ==========

    /// Apply a force to the whole collection immediately.
    pub fn apply_force(&mut self, force: Force) {
        force.apply(&mut self.particles);
    }

    /// Apply the settings-selected pointer force at `position`.
    pub fn apply_pointer_force(&mut self, position: Vec2, motion: PointerMotion) {
        Force::from_settings(position, motion, &self.settings).apply(&mut self.particles);
    }

    /// Push particles out of an overlay region. Honors the
    /// `overlay_repulsion.enabled` setting.
    pub fn apply_overlay_repulsion(&mut self, region: RepulsionRegion) {
        if !self.settings.overlay_repulsion.enabled {
            return;
        }
        Force::overlay(region, &self.settings.overlay_repulsion).apply(&mut self.particles);
    }

    // ========== Configuration ==========

    /// Swap in a new settings snapshot, effective from the next call.
    ///
    /// The noise tables persist; only the noise configuration is updated.
    pub fn update_settings(&mut self, settings: Settings) {
        if let Err(error) = settings.validate() {
            warn!(%error, "settings failed validation");
        }
        self.noise.set_config(settings.noise);
        self.settings = settings;
    }

    /// Report a canvas resize.
    ///
    /// Existing particle positions rescale by the exact per-axis ratios;
    /// velocities rescale by the average of the two so motion feel is not
    /// distorted under aspect changes. Skipped when no particles exist or
    /// no valid previous size was set.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        let old_width = self.canvas_width;
        let old_height = self.canvas_height;
        self.canvas_width = width;
        self.canvas_height = height;

        if old_width > 0.0 && old_height > 0.0 && !self.particles.is_empty() {
            let scale_x = width / old_width;
            let scale_y = height / old_height;
            let velocity_scale = (scale_x + scale_y) / 2.0;

            for particle in &mut self.particles {
                particle.position.x *= scale_x;
                particle.position.y *= scale_y;
                particle.velocity *= velocity_scale;
            }
            debug!(width, height, "canvas resized, particles rescaled");
        }
    }

    // ========== Accessors ==========

    /// Read-only particle snapshot for rendering.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable particle access for host-driven custom forces.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Current population.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Remove all particles. Settings and accumulators are untouched.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Active settings snapshot.
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The noise field driving turbulence.
    #[inline]
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Current canvas size as (width, height).
    #[inline]
    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Fill `out` with packed instance records, reusing its allocation.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.particles.iter().map(Particle::instance));
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
