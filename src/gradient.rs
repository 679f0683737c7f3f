//! Color and opacity gradients sampled over particle lifetime.
//!
//! A gradient is a list of stops over the [0, 1] range. Sampling clamps to
//! the end stops and linearly interpolates between the two bracketing stops.
//! Callers may hand stops in any order; construction sorts them by position.
//!
//! # Example
//!
//! ```ignore
//! use embersim::gradient::{ColorGradient, ColorStop, hex_color};
//!
//! let ramp = ColorGradient::new(vec![
//!     ColorStop { position: 0.0, color: hex_color("#FFF4C2") },
//!     ColorStop { position: 1.0, color: hex_color("#8B1A00") },
//! ]);
//! let mid = ramp.sample(0.5);
//! ```

use glam::Vec3;

/// One control point of a color gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient, 0.0 to 1.0.
    pub position: f32,
    /// RGB color, each channel 0.0 to 1.0.
    pub color: Vec3,
}

/// One control point of an opacity gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityStop {
    /// Position along the gradient, 0.0 to 1.0.
    pub position: f32,
    /// Opacity, 0.0 to 1.0.
    pub opacity: f32,
}

/// Piecewise-linear color ramp.
///
/// Stops are kept sorted by position. An empty gradient samples as white.
#[derive(Clone, Debug)]
pub struct ColorGradient {
    stops: Vec<ColorStop>,
}

impl ColorGradient {
    /// Create a gradient from stops in any order.
    pub fn new(mut stops: Vec<ColorStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    /// The stops, sorted by position.
    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Whether the gradient has no stops.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Sample the color at `position`.
    ///
    /// Positions outside [0, 1] clamp to the nearest end stop. A position at
    /// a stop's exact location returns that stop's color exactly.
    pub fn sample(&self, position: f32) -> Vec3 {
        if self.stops.is_empty() {
            return Vec3::ONE;
        }
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        let position = position.clamp(0.0, 1.0);

        if position <= first.position {
            return first.color;
        }
        if position >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if position >= left.position && position <= right.position {
                let range = right.position - left.position;
                let t = if range == 0.0 {
                    0.0
                } else {
                    (position - left.position) / range
                };
                return left.color.lerp(right.color, t);
            }
        }

        last.color
    }
}

/// Piecewise-linear opacity ramp.
///
/// Same contract as [`ColorGradient`]; an empty gradient samples as 1.0.
#[derive(Clone, Debug)]
pub struct OpacityGradient {
    stops: Vec<OpacityStop>,
}

impl OpacityGradient {
    /// Create a gradient from stops in any order.
    pub fn new(mut stops: Vec<OpacityStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    /// The stops, sorted by position.
    #[inline]
    pub fn stops(&self) -> &[OpacityStop] {
        &self.stops
    }

    /// Whether the gradient has no stops.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Sample the opacity at `position`, clamped to [0, 1] at the input.
    pub fn sample(&self, position: f32) -> f32 {
        if self.stops.is_empty() {
            return 1.0;
        }
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        let position = position.clamp(0.0, 1.0);

        if position <= first.position {
            return first.opacity;
        }
        if position >= last.position {
            return last.opacity;
        }

        for pair in self.stops.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if position >= left.position && position <= right.position {
                let range = right.position - left.position;
                let t = if range == 0.0 {
                    0.0
                } else {
                    (position - left.position) / range
                };
                return left.opacity + (right.opacity - left.opacity) * t;
            }
        }

        last.opacity
    }
}

/// Parse a `#rrggbb` hex color into RGB channels in 0..1.
///
/// The leading `#` is optional. Malformed input yields white.
pub fn hex_color(hex: &str) -> Vec3 {
    let s = hex.strip_prefix('#').unwrap_or(hex);
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Vec3::ONE;
    }
    let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(255);
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop() -> ColorGradient {
        ColorGradient::new(vec![
            ColorStop {
                position: 0.0,
                color: Vec3::new(1.0, 0.0, 0.0),
            },
            ColorStop {
                position: 1.0,
                color: Vec3::new(0.0, 0.0, 1.0),
            },
        ])
    }

    #[test]
    fn test_sample_at_exact_stop() {
        let g = two_stop();
        assert_eq!(g.sample(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(g.sample(1.0), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sample_midpoint() {
        let g = two_stop();
        let mid = g.sample(0.5);
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert!((mid.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_outside_range() {
        let g = two_stop();
        assert_eq!(g.sample(-0.5), g.sample(0.0));
        assert_eq!(g.sample(1.5), g.sample(1.0));
    }

    #[test]
    fn test_unsorted_stops_are_sorted() {
        let g = ColorGradient::new(vec![
            ColorStop {
                position: 1.0,
                color: Vec3::ZERO,
            },
            ColorStop {
                position: 0.0,
                color: Vec3::ONE,
            },
        ]);
        assert_eq!(g.stops()[0].position, 0.0);
        assert_eq!(g.sample(0.0), Vec3::ONE);
    }

    #[test]
    fn test_single_stop_is_constant() {
        let g = ColorGradient::new(vec![ColorStop {
            position: 0.5,
            color: Vec3::new(0.2, 0.4, 0.6),
        }]);
        assert_eq!(g.sample(0.0), Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(g.sample(0.5), Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(g.sample(1.0), Vec3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_empty_gradient_samples_white() {
        let g = ColorGradient::new(Vec::new());
        assert_eq!(g.sample(0.5), Vec3::ONE);
        let o = OpacityGradient::new(Vec::new());
        assert_eq!(o.sample(0.5), 1.0);
    }

    #[test]
    fn test_opacity_interpolation() {
        let g = OpacityGradient::new(vec![
            OpacityStop {
                position: 0.0,
                opacity: 0.0,
            },
            OpacityStop {
                position: 0.5,
                opacity: 1.0,
            },
            OpacityStop {
                position: 1.0,
                opacity: 0.0,
            },
        ]);
        assert_eq!(g.sample(0.5), 1.0);
        assert!((g.sample(0.25) - 0.5).abs() < 1e-6);
        assert!((g.sample(0.75) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hex_color_parses() {
        let c = hex_color("#ff0000");
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!(c.y < 1e-6);
        assert!(c.z < 1e-6);

        // Leading '#' optional
        assert_eq!(hex_color("4ecdc4"), hex_color("#4ECDC4"));
    }

    #[test]
    fn test_hex_color_fallback_is_white() {
        assert_eq!(hex_color("not a color"), Vec3::ONE);
        assert_eq!(hex_color("#fff"), Vec3::ONE);
        assert_eq!(hex_color(""), Vec3::ONE);
    }
}
