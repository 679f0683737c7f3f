//! Simulation settings.
//!
//! A [`Settings`] value is the complete configuration snapshot consumed by
//! every component. It is treated as immutable within a frame: the
//! simulation reads one coherent snapshot through an entire update, and
//! hosts swap the whole value via `Simulation::update_settings` rather than
//! mutating pieces mid-frame.
//!
//! Leaves are plain numbers, flags, and small enums. Path-based access for
//! UI-style hosts lives in the [`config`](crate::config) module.
//!
//! # Defaults
//!
//! `Settings::default()` is a tuned ember effect: bottom-area ambient
//! spawning, gentle upward drift, three warm-to-cool color ramps, and
//! speed-gated glow/bloom/trail feedback.

use crate::error::SettingsError;
use crate::gradient::{hex_color, ColorGradient, ColorStop, OpacityGradient, OpacityStop};
use tracing::warn;

/// Window over which speed-gated effects ramp to full intensity, px/s.
pub const SPEED_RAMP: f32 = 200.0;

/// Inclusive numeric range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Width of the span.
    #[inline]
    pub fn extent(&self) -> f32 {
        self.max - self.min
    }
}

/// Top-level settings tree.
#[derive(Clone, Debug)]
pub struct Settings {
    pub particles: ParticleSettings,
    pub child_spawning: ChildSpawnSettings,
    pub noise: NoiseSettings,
    pub pointer: PointerSettings,
    pub overlay_repulsion: OverlayRepulsionSettings,
    pub visual: VisualSettings,
}

/// Population, lifetime, and per-particle physics parameters.
#[derive(Clone, Debug)]
pub struct ParticleSettings {
    /// Hard population ceiling, enforced before every individual spawn.
    pub max_count: usize,
    /// Multiplier on the width-derived ambient spawn rate.
    pub spawn_rate: f32,
    /// Lifetime drawn uniformly from this span at spawn, seconds.
    pub lifetime: Span,
    pub size: SizeSettings,
    pub rotation: RotationSettings,
    /// Constant upward acceleration, velocity units per second.
    pub upward_force: f32,
    /// Exponential velocity decay coefficient, 1/s. Zero disables drag.
    pub drag: f32,
    /// Ambient spawn region as fractions of the canvas.
    pub spawn_area: SpawnArea,
}

/// Particle size at spawn: `base - r * (base * random_variation)`.
#[derive(Clone, Copy, Debug)]
pub struct SizeSettings {
    pub base: f32,
    /// 0.0 = no variation, 1.0 = size may shrink to zero.
    pub random_variation: f32,
}

/// Rotation speed at spawn, with a random sign.
#[derive(Clone, Copy, Debug)]
pub struct RotationSettings {
    /// Base rotation speed, radians per second.
    pub speed: f32,
    /// 0.0 = no variation, 1.0 = speed may drop to zero.
    pub random_variation: f32,
}

/// Ambient spawn region, both axes as fractions of canvas extent.
#[derive(Clone, Copy, Debug)]
pub struct SpawnArea {
    pub x: Span,
    pub y: Span,
}

/// Probabilistic mid-life child spawning.
#[derive(Clone, Copy, Debug)]
pub struct ChildSpawnSettings {
    /// Per-frame Bernoulli probability per eligible particle.
    pub probability: f32,
    pub force_multiplier: ForceMultiplierSettings,
    /// Ceiling on children per parent.
    pub max_children: u32,
}

/// Child velocity inheritance: `target + (r - 0.5) * random_range`.
#[derive(Clone, Copy, Debug)]
pub struct ForceMultiplierSettings {
    pub target: f32,
    pub random_range: f32,
}

/// Noise field shape and per-axis force strength.
#[derive(Clone, Copy, Debug)]
pub struct NoiseSettings {
    /// Spatial scale applied to sample coordinates.
    pub scale: f32,
    pub strength: AxisStrength,
    /// Time multiplier animating the field.
    pub speed: f32,
    pub octaves: u32,
}

/// Per-axis noise force strength.
#[derive(Clone, Copy, Debug)]
pub struct AxisStrength {
    pub horizontal: f32,
    pub vertical: f32,
}

/// Which pointer force the host applies by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceKind {
    Radial,
    Suction,
    Directional,
    Sweep,
    Follow,
    Boids,
}

/// Pointer interaction parameters shared by the force solvers.
#[derive(Clone, Copy, Debug)]
pub struct PointerSettings {
    pub force_kind: ForceKind,
    pub strength: f32,
    /// Radius of effect in pixels.
    pub radius: f32,
    /// Exponent shaping how force weakens toward the edge of the radius.
    pub falloff_curve: f32,
    /// Burst size on click, and particles/sec while the pointer is held.
    pub click_spawn_count: u32,
    pub sweep: SweepSettings,
    pub follow: FollowSettings,
    pub boids: BoidsSettings,
}

/// Sweep force tuning.
#[derive(Clone, Copy, Debug)]
pub struct SweepSettings {
    /// Multiplier on pointer speed for the movement-aligned push.
    pub speed_multiplier: f32,
    /// 0 = tight beam along the motion, 1 = wide spread.
    pub directional_spread: f32,
}

/// Follow force tuning.
#[derive(Clone, Copy, Debug)]
pub struct FollowSettings {
    /// 0 = only particles behind the motion, 1 = uniform around the pointer.
    pub spread: f32,
    pub strength: f32,
    /// Optional pull toward the pointer; zero disables it.
    pub suction_strength: f32,
}

/// Boids force tuning.
#[derive(Clone, Copy, Debug)]
pub struct BoidsSettings {
    /// Maximum particle speed while under influence, px/s. Zero disables.
    pub speed_limit: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
}

/// Region-based repulsion keeping particles out of an overlay.
#[derive(Clone, Copy, Debug)]
pub struct OverlayRepulsionSettings {
    pub enabled: bool,
    pub force_multiplier: f32,
    /// Padding in pixels added around the overlay rectangle.
    pub padding: f32,
    pub falloff_curve: f32,
}

/// Gradients and speed-gated visual effects.
#[derive(Clone, Debug)]
pub struct VisualSettings {
    /// Color ramps; each particle is assigned one at spawn.
    pub gradients: [ColorGradient; 3],
    /// Opacity over lifetime, shared by all particles.
    pub opacity: OpacityGradient,
    pub effects: EffectSettings,
}

/// Speed-gated effect intensities.
#[derive(Clone, Copy, Debug)]
pub struct EffectSettings {
    pub glow: SpeedEffect,
    pub bloom: SpeedEffect,
    pub trail: TrailSettings,
}

/// An intensity that ramps with particle speed.
///
/// Intensity is `clamp((speed - min_speed) / SPEED_RAMP, 0, 1) *
/// max_intensity`.
#[derive(Clone, Copy, Debug)]
pub struct SpeedEffect {
    /// Speed at which the effect starts to appear, px/s.
    pub min_speed: f32,
    pub max_intensity: f32,
}

impl SpeedEffect {
    /// Intensity at `speed` in pixels per second.
    #[inline]
    pub fn intensity(&self, speed: f32) -> f32 {
        ((speed - self.min_speed) / SPEED_RAMP).clamp(0.0, 1.0) * self.max_intensity
    }
}

/// Motion trail configuration.
#[derive(Clone, Copy, Debug)]
pub struct TrailSettings {
    pub enabled: bool,
    /// Speed at which the trail starts to appear, px/s.
    pub min_speed: f32,
    /// Trail length at full speed, in history samples.
    pub max_length: usize,
    pub length_multiplier: f32,
    /// Exponent shaping the alpha falloff along the trail.
    pub falloff_exponent: f32,
}

impl TrailSettings {
    /// Normalized 0..1 trail ramp at `speed` in pixels per second.
    #[inline]
    pub fn intensity(&self, speed: f32) -> f32 {
        ((speed - self.min_speed) / SPEED_RAMP).clamp(0.0, 1.0)
    }

    /// Trail sample count at `speed` in pixels per second.
    #[inline]
    pub fn target_length(&self, speed: f32) -> usize {
        (self.intensity(speed) * self.max_length as f32 * self.length_multiplier).floor() as usize
    }
}

/// Population/visual quality presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Low,
    Medium,
    High,
    Ultra,
}

impl Settings {
    /// Apply a quality preset over the current values.
    pub fn apply_preset(&mut self, quality: Quality) {
        let (max_count, trail_length) = match quality {
            Quality::Low => (200, 10),
            Quality::Medium => (500, 15),
            Quality::High => (1000, 20),
            Quality::Ultra => (2000, 30),
        };
        self.particles.max_count = max_count;
        self.visual.effects.trail.max_length = trail_length;
    }

    /// Check structural validity.
    ///
    /// Conditions the simulation cannot repair by clamping are errors:
    /// empty gradients, inverted or non-positive lifetime, inverted
    /// spawn-area axes. Out-of-range scalars that use sites clamp or
    /// tolerate are logged as warnings and accepted.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let lifetime = self.particles.lifetime;
        if lifetime.min <= 0.0 || lifetime.max <= 0.0 {
            return Err(SettingsError::NonPositive {
                field: "particles.lifetime",
            });
        }
        if lifetime.min > lifetime.max {
            return Err(SettingsError::InvertedRange {
                field: "particles.lifetime",
            });
        }

        let area = self.particles.spawn_area;
        if area.x.min > area.x.max {
            return Err(SettingsError::InvertedRange {
                field: "particles.spawn_area.x",
            });
        }
        if area.y.min > area.y.max {
            return Err(SettingsError::InvertedRange {
                field: "particles.spawn_area.y",
            });
        }

        for (i, gradient) in self.visual.gradients.iter().enumerate() {
            if gradient.is_empty() {
                let name = ["visual.gradients[0]", "visual.gradients[1]", "visual.gradients[2]"][i];
                return Err(SettingsError::EmptyGradient { name });
            }
        }
        if self.visual.opacity.is_empty() {
            return Err(SettingsError::EmptyGradient {
                name: "visual.opacity",
            });
        }

        if self.particles.max_count == 0 {
            warn!("particles.max_count is 0; nothing will ever spawn");
        }
        if !(0.0..=1.0).contains(&self.child_spawning.probability) {
            warn!(
                probability = self.child_spawning.probability,
                "child_spawning.probability outside [0, 1]"
            );
        }
        for (axis, span) in [("x", area.x), ("y", area.y)] {
            if span.min < 0.0 || span.max > 1.0 {
                warn!(axis, "spawn_area fractions outside [0, 1]");
            }
        }
        for (field, value) in [
            ("particles.spawn_rate", self.particles.spawn_rate),
            ("particles.size.base", self.particles.size.base),
            ("particles.drag", self.particles.drag),
            ("pointer.strength", self.pointer.strength),
            ("pointer.radius", self.pointer.radius),
        ] {
            if value < 0.0 {
                warn!(field, value, "negative setting; treated as inactive");
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particles: ParticleSettings::default(),
            child_spawning: ChildSpawnSettings::default(),
            noise: NoiseSettings::default(),
            pointer: PointerSettings::default(),
            overlay_repulsion: OverlayRepulsionSettings::default(),
            visual: VisualSettings::default(),
        }
    }
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            max_count: 1000,
            spawn_rate: 50.0,
            lifetime: Span::new(2.0, 5.0),
            size: SizeSettings {
                base: 12.0,
                random_variation: 0.5,
            },
            rotation: RotationSettings {
                speed: 2.0,
                random_variation: 0.8,
            },
            upward_force: 0.5,
            drag: 0.06,
            spawn_area: SpawnArea {
                x: Span::new(0.1, 0.9),
                y: Span::new(0.7, 0.9),
            },
        }
    }
}

impl Default for ChildSpawnSettings {
    fn default() -> Self {
        Self {
            probability: 0.002,
            force_multiplier: ForceMultiplierSettings {
                target: 1.2,
                random_range: 0.3,
            },
            max_children: 3,
        }
    }
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 0.008,
            strength: AxisStrength {
                horizontal: 0.3,
                vertical: 0.1,
            },
            speed: 0.5,
            octaves: 3,
        }
    }
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            force_kind: ForceKind::Radial,
            strength: 150.0,
            radius: 100.0,
            falloff_curve: 2.0,
            click_spawn_count: 5,
            sweep: SweepSettings {
                speed_multiplier: 1.0,
                directional_spread: 0.5,
            },
            follow: FollowSettings {
                spread: 1.0,
                strength: 1.0,
                suction_strength: 0.0,
            },
            boids: BoidsSettings {
                speed_limit: 200.0,
                separation: 1.5,
                alignment: 1.0,
                cohesion: 1.2,
            },
        }
    }
}

impl Default for OverlayRepulsionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            force_multiplier: 1.0,
            padding: 20.0,
            falloff_curve: 2.0,
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            gradients: [
                // Golden: pale flash to deep amber
                ColorGradient::new(vec![
                    ColorStop {
                        position: 0.0,
                        color: hex_color("#FFF4C2"),
                    },
                    ColorStop {
                        position: 0.35,
                        color: hex_color("#FFD700"),
                    },
                    ColorStop {
                        position: 1.0,
                        color: hex_color("#8A5A00"),
                    },
                ]),
                // Orange red: warm flash to ember red
                ColorGradient::new(vec![
                    ColorStop {
                        position: 0.0,
                        color: hex_color("#FFE0B3"),
                    },
                    ColorStop {
                        position: 0.35,
                        color: hex_color("#FF6B35"),
                    },
                    ColorStop {
                        position: 1.0,
                        color: hex_color("#7A1F00"),
                    },
                ]),
                // Teal: cool spark fading into deep sea
                ColorGradient::new(vec![
                    ColorStop {
                        position: 0.0,
                        color: hex_color("#D8FFF9"),
                    },
                    ColorStop {
                        position: 0.35,
                        color: hex_color("#4ECDC4"),
                    },
                    ColorStop {
                        position: 1.0,
                        color: hex_color("#0E4F4A"),
                    },
                ]),
            ],
            // Fast fade-in, hold, slow fade-out
            opacity: OpacityGradient::new(vec![
                OpacityStop {
                    position: 0.0,
                    opacity: 0.0,
                },
                OpacityStop {
                    position: 0.1,
                    opacity: 1.0,
                },
                OpacityStop {
                    position: 0.7,
                    opacity: 1.0,
                },
                OpacityStop {
                    position: 1.0,
                    opacity: 0.0,
                },
            ]),
            effects: EffectSettings::default(),
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            glow: SpeedEffect {
                min_speed: 100.0,
                max_intensity: 0.8,
            },
            bloom: SpeedEffect {
                min_speed: 150.0,
                max_intensity: 1.5,
            },
            trail: TrailSettings {
                enabled: true,
                min_speed: 50.0,
                max_length: 20,
                length_multiplier: 1.0,
                falloff_exponent: 1.5,
            },
        }
    }
}
