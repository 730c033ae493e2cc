//! Interval arithmetic for ray parameter ranges.
//!
//! Provides the open acceptance window `(min, max)` used when testing a ray
//! against a shape: `min` rejects self-intersections at the previous bounce
//! point, `max` is the closest hit recorded so far this bounce.

/// Minimum accepted hit distance; avoids re-hitting the surface a bounce starts on.
pub const HIT_EPSILON: f32 = 1e-3;

/// Interval [min, max] for range checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f32,
    /// Maximum value of the interval
    pub max: f32,
}

impl Interval {
    /// Create a new interval with given min and max values
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Acceptance window for a bounce: `(HIT_EPSILON, closest)`.
    pub fn hit_window(closest: f32) -> Self {
        Self::new(HIT_EPSILON, closest)
    }

    /// Check if the interval surrounds the given value (exclusive bounds)
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounds_is_exclusive() {
        let window = Interval::new(1.0, 2.0);
        assert!(window.surrounds(1.5));
        assert!(!window.surrounds(1.0));
        assert!(!window.surrounds(2.0));
    }

    #[test]
    fn test_hit_window_rejects_self_intersection() {
        let window = Interval::hit_window(f32::INFINITY);
        assert!(!window.surrounds(0.0));
        assert!(!window.surrounds(HIT_EPSILON));
        assert!(window.surrounds(1e6));
        assert!(!window.surrounds(f32::INFINITY));
    }
}
