//! # Embersim - Ember Particle Simulation
//!
//! Interactive 2D ember and spark effects with a renderer-agnostic core.
//!
//! Embersim owns the particle state and physics (spawning, turbulence,
//! pointer forces, lifetime, visual effect intensities) and hands back
//! plain data every frame. Hosts draw the particles however they like:
//! canvas, GPU instancing via the packed [`ParticleInstance`] records, or
//! anything that can consume positions and colors.
//!
//! ## Quick Start
//!
//! ```ignore
//! use embersim::prelude::*;
//!
//! fn main() {
//!     let mut sim = Simulation::new(Settings::default())
//!         .with_canvas_size(1280.0, 720.0);
//!     let mut time = Time::new();
//!
//!     loop {
//!         let (_elapsed, delta) = time.update();
//!         sim.update(delta);
//!
//!         for particle in sim.particles() {
//!             // draw at particle.position with particle.size,
//!             // particle.color, particle.opacity, particle.glow ...
//!         }
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Particles spawn ambiently in a configurable region (the default is the
//! lower band of the canvas, like embers rising from a fire), drift upward
//! under turbulence, and fade out over a randomized lifetime. Each particle
//! carries one of three color ramps sampled over its life, and its glow,
//! bloom, and trail intensities follow its speed.
//!
//! ### Forces
//!
//! Pointer interaction is a [`Force`] applied to the whole collection:
//!
//! ```ignore
//! sim.apply_pointer_force(cursor, PointerMotion::new(cursor_velocity));
//! ```
//!
//! | Category | Forces |
//! |----------|--------|
//! | Point | [`Force::Radial`], [`Force::Suction`] |
//! | Motion | [`Force::Sweep`], [`Force::Follow`] |
//! | Flocking | [`Force::Boids`] |
//! | Region | [`Force::Directional`], [`Force::OverlayRepulsion`] |
//!
//! Which force the pointer applies is selected by
//! [`settings::PointerSettings::force_kind`]; hosts with custom needs can
//! build [`Force`] values directly and pass them to
//! [`Simulation::apply_force`].
//!
//! ### Runtime configuration
//!
//! [`ConfigStore`] exposes every numeric and boolean settings leaf under a
//! dotted path (`"particles.max_count"`, `"pointer.radius"`, ...) and
//! notifies subscribers on every change, which is the natural shape for
//! control-panel hosts:
//!
//! ```ignore
//! let mut config = ConfigStore::new(Settings::default());
//! config.subscribe(|_change, settings| {
//!     sim.update_settings(settings.clone());
//! });
//! config.set("pointer.radius", 180.0)?;
//! ```
//!
//! ### Interaction events
//!
//! - Click burst: [`Simulation::spawn_at`]
//! - Held pointer: [`Simulation::start_pointer_spawn`] /
//!   [`Simulation::stop_pointer_spawn`]
//! - Keep-out regions under UI overlays:
//!   [`Simulation::apply_overlay_repulsion`]

pub mod config;
mod error;
pub mod forces;
pub mod gradient;
mod noise;
mod particle;
pub mod settings;
mod simulation;
pub mod time;

pub use bytemuck;
pub use config::{ConfigChange, ConfigStore, SettingValue, SubscriptionId};
pub use error::{ConfigError, SettingsError};
pub use forces::{Force, PointerMotion, RepulsionRegion};
pub use glam::{Vec2, Vec3};
pub use gradient::{hex_color, ColorGradient, ColorStop, OpacityGradient, OpacityStop};
pub use noise::{NoiseField, NoiseGridCell};
pub use particle::{Particle, ParticleInstance, TrailPoint, UpdateStatus};
pub use settings::{ForceKind, Quality, Settings};
pub use simulation::Simulation;
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use embersim::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`] - the simulation manager
/// - [`Settings`], [`ForceKind`], [`Quality`] - configuration
/// - [`ConfigStore`] - path-based runtime configuration
/// - [`Force`], [`PointerMotion`], [`RepulsionRegion`] - pointer forces
/// - [`Particle`], [`ParticleInstance`] - per-particle render data
/// - [`Time`] - the frame clock
/// - [`Vec2`], [`Vec3`] - glam vector types
pub mod prelude {
    pub use crate::config::{ConfigChange, ConfigStore, SettingValue};
    pub use crate::forces::{Force, PointerMotion, RepulsionRegion};
    pub use crate::gradient::{ColorGradient, ColorStop, OpacityGradient, OpacityStop};
    pub use crate::settings::{ForceKind, Quality, Settings};
    pub use crate::simulation::Simulation;
    pub use crate::time::Time;
    pub use crate::{NoiseField, Particle, ParticleInstance};
    pub use crate::{Vec2, Vec3};
}
