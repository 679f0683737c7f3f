//! Procedural noise field driving organic particle motion.
//!
//! Classic 3D gradient noise evaluated over a seeded permutation lattice,
//! layered into octaves and differentiated into a smooth 2D force field.
//! The permutation and gradient tables are generated once at construction
//! from an explicit seed; reconfiguring scale, speed, or octaves never
//! regenerates them, so a seeded field is deterministic for its lifetime.
//!
//! # Example
//!
//! ```ignore
//! use embersim::settings::NoiseSettings;
//! use embersim::NoiseField;
//!
//! let field = NoiseField::new(42, NoiseSettings::default());
//! let force = field.force_at(120.0, 340.0, 1.5);
//! ```

use crate::settings::NoiseSettings;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Sampling offset for the central-difference force gradient.
const FORCE_SAMPLE_OFFSET: f32 = 0.01;

/// Display scale applied to force vectors in the debug grid.
const GRID_DISPLAY_SCALE: f32 = 50.0;

/// One cell of the visualization grid produced by [`NoiseField::grid`].
#[derive(Clone, Copy, Debug)]
pub struct NoiseGridCell {
    /// Sample position in canvas pixels.
    pub position: Vec2,
    /// Force at the sample position, scaled for display.
    pub force: Vec2,
}

/// Seeded gradient-noise field with 2D force sampling.
pub struct NoiseField {
    /// Permutation table, 256 entries duplicated to 512 for wraparound.
    permutation: [usize; 512],
    /// Gradient vectors indexed through the permutation table.
    gradients: [Vec3; 256],
    config: NoiseSettings,
}

impl NoiseField {
    /// Build a field from an explicit seed and configuration.
    ///
    /// The same seed always produces the same tables, independent of the
    /// configuration passed here or later.
    pub fn new(seed: u64, config: NoiseSettings) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut table = [0usize; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i;
        }
        // Fisher-Yates shuffle
        for i in (1..256).rev() {
            let j = rng.gen_range(0..=i);
            table.swap(i, j);
        }
        let mut permutation = [0usize; 512];
        permutation[..256].copy_from_slice(&table);
        permutation[256..].copy_from_slice(&table);

        let mut gradients = [Vec3::ZERO; 256];
        for gradient in gradients.iter_mut() {
            let angle = rng.gen::<f32>() * TAU;
            *gradient = Vec3::new(
                angle.cos(),
                angle.sin(),
                (rng.gen::<f32>() - 0.5) * 2.0,
            );
        }

        Self {
            permutation,
            gradients,
            config,
        }
    }

    /// Swap the configuration. Tables persist.
    pub fn set_config(&mut self, config: NoiseSettings) {
        self.config = config;
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &NoiseSettings {
        &self.config
    }

    /// Raw lattice noise at a point, scaled by the configured spatial scale.
    ///
    /// Output is in roughly [-1, 1] and smooth in all three coordinates.
    pub fn noise3d(&self, x: f32, y: f32, z: f32) -> f32 {
        let x = x * self.config.scale;
        let y = y * self.config.scale;
        let z = z * self.config.scale;

        // Unit cube containing the point
        let xi = ((x.floor() as i32) & 255) as usize;
        let yi = ((y.floor() as i32) & 255) as usize;
        let zi = ((z.floor() as i32) & 255) as usize;

        // Relative position within the cube
        let x = x - x.floor();
        let y = y - y.floor();
        let z = z - z.floor();

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        // Hash the cube corners
        let a = self.permutation[xi] + yi;
        let aa = self.permutation[a] + zi;
        let ab = self.permutation[a + 1] + zi;
        let b = self.permutation[xi + 1] + yi;
        let ba = self.permutation[b] + zi;
        let bb = self.permutation[b + 1] + zi;

        // Blend the gradient dot products from all eight corners
        lerp(
            lerp(
                lerp(
                    self.corner_dot(aa, x, y, z),
                    self.corner_dot(ba, x - 1.0, y, z),
                    u,
                ),
                lerp(
                    self.corner_dot(ab, x, y - 1.0, z),
                    self.corner_dot(bb, x - 1.0, y - 1.0, z),
                    u,
                ),
                v,
            ),
            lerp(
                lerp(
                    self.corner_dot(aa + 1, x, y, z - 1.0),
                    self.corner_dot(ba + 1, x - 1.0, y, z - 1.0),
                    u,
                ),
                lerp(
                    self.corner_dot(ab + 1, x, y - 1.0, z - 1.0),
                    self.corner_dot(bb + 1, x - 1.0, y - 1.0, z - 1.0),
                    u,
                ),
                v,
            ),
            w,
        )
    }

    /// Layered noise: each octave doubles frequency and halves amplitude.
    ///
    /// Normalized by total amplitude so the result stays in [-1, 1].
    /// An octave count of zero is treated as one.
    pub fn octave_noise(&self, x: f32, y: f32, z: f32, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total = 0.0;

        for _ in 0..octaves.max(1) {
            value += self.noise3d(x * frequency, y * frequency, z * frequency) * amplitude;
            total += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value / total
    }

    /// Force vector at a canvas position and time.
    ///
    /// Central difference of the octave noise at ±0.01 in x and y, divided
    /// by the sample span. The result is a smooth vector field suited to
    /// drifting motion rather than a raw scalar sample.
    pub fn force_at(&self, x: f32, y: f32, time: f32) -> Vec2 {
        let octaves = self.config.octaves;
        let t = time * self.config.speed;
        let offset = FORCE_SAMPLE_OFFSET;

        let fx = self.octave_noise(x + offset, y, t, octaves)
            - self.octave_noise(x - offset, y, t, octaves);
        let fy = self.octave_noise(x, y + offset, t, octaves)
            - self.octave_noise(x, y - offset, t, octaves);

        Vec2::new(fx, fy) / (2.0 * offset)
    }

    /// Sample the force field on a step grid for host-side visualization.
    ///
    /// Forces are scaled for display. `resolution` is the number of steps
    /// per axis; zero is treated as one.
    pub fn grid(&self, width: f32, height: f32, time: f32, resolution: u32) -> Vec<NoiseGridCell> {
        let resolution = resolution.max(1);
        let step_x = width / resolution as f32;
        let step_y = height / resolution as f32;
        let mut cells = Vec::new();

        let mut y = 0.0;
        while y < height {
            let mut x = 0.0;
            while x < width {
                let force = self.force_at(x, y, time);
                cells.push(NoiseGridCell {
                    position: Vec2::new(x, y),
                    force: force * GRID_DISPLAY_SCALE,
                });
                x += step_x;
            }
            y += step_y;
        }

        cells
    }

    #[inline]
    fn corner_dot(&self, hash: usize, x: f32, y: f32, z: f32) -> f32 {
        let g = self.gradients[self.permutation[hash]];
        g.x * x + g.y * y + g.z * z
    }
}

/// Quintic fade curve: 6t⁵ - 15t⁴ + 10t³.
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let a = NoiseField::new(7, NoiseSettings::default());
        let b = NoiseField::new(7, NoiseSettings::default());

        for i in 0..20 {
            let p = i as f32 * 13.7;
            assert_eq!(a.noise3d(p, p * 0.5, p * 0.25), b.noise3d(p, p * 0.5, p * 0.25));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1, NoiseSettings::default());
        let b = NoiseField::new(2, NoiseSettings::default());

        let mut any_diff = false;
        for i in 0..20 {
            let p = 50.0 + i as f32 * 37.3;
            if a.noise3d(p, p, 0.0) != b.noise3d(p, p, 0.0) {
                any_diff = true;
                break;
            }
        }
        assert!(any_diff);
    }

    #[test]
    fn test_octave_noise_stays_bounded() {
        let field = NoiseField::new(99, NoiseSettings::default());
        for i in 0..100 {
            let x = i as f32 * 23.1;
            let y = i as f32 * 7.9;
            let v = field.octave_noise(x, y, 0.5, 4);
            assert!(v.is_finite());
            assert!(v.abs() <= 1.5, "octave noise out of range: {}", v);
        }
    }

    #[test]
    fn test_zero_octaves_is_finite() {
        let field = NoiseField::new(3, NoiseSettings::default());
        let v = field.octave_noise(10.0, 10.0, 0.0, 0);
        assert!(v.is_finite());
    }

    #[test]
    fn test_reconfigure_keeps_tables() {
        let reference = NoiseField::new(42, NoiseSettings::default());

        let other_config = NoiseSettings {
            scale: 0.5,
            ..NoiseSettings::default()
        };
        let mut field = NoiseField::new(42, other_config);
        field.set_config(NoiseSettings::default());

        assert_eq!(
            reference.noise3d(100.0, 200.0, 3.0),
            field.noise3d(100.0, 200.0, 3.0)
        );
    }

    #[test]
    fn test_force_is_smooth_and_finite() {
        let field = NoiseField::new(5, NoiseSettings::default());
        let f1 = field.force_at(100.0, 100.0, 1.0);
        let f2 = field.force_at(100.5, 100.0, 1.0);

        assert!(f1.x.is_finite() && f1.y.is_finite());
        // Nearby samples of a smooth field stay close
        assert!((f1 - f2).length() < 1.0);
    }

    #[test]
    fn test_grid_cell_count() {
        let field = NoiseField::new(1, NoiseSettings::default());
        let cells = field.grid(100.0, 100.0, 0.0, 4);
        assert_eq!(cells.len(), 16);
    }
}
