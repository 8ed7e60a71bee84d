//! Math utilities and helpers.

use glam::Vec3;

/// Distance used in place of infinity for axes the ray never crosses.
pub const NO_CROSSING: f32 = 10_000_000.0;

/// Ray for raycasting operations.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (should be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get a point along the ray at distance t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// End point of the segment covering `max_distance` voxels.
    #[inline]
    pub fn segment_end(&self, max_distance: f32) -> Vec3 {
        self.at(max_distance)
    }
}

/// Per-axis state of a voxel grid traversal along a segment.
///
/// Distances are expressed as fractions of the segment, so the traversal has
/// covered the whole segment once every axis has `t_max > 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisStep {
    /// -1, 0 or 1
    pub step: i32,
    /// Segment fraction between two boundary crossings on this axis
    pub t_delta: f32,
    /// Segment fraction at which the next boundary is crossed
    pub t_max: f32,
}

impl AxisStep {
    /// Set up stepping along one axis for a segment from `start` to `end`.
    pub fn new(start: f32, end: f32) -> Self {
        let span = end - start;
        let step = if span > 0.0 {
            1
        } else if span < 0.0 {
            -1
        } else {
            0
        };
        let t_delta = if step == 0 {
            NO_CROSSING
        } else {
            (step as f32 / span).min(NO_CROSSING)
        };
        let fract = start - start.floor();
        let t_max = if step > 0 {
            t_delta * (1.0 - fract)
        } else {
            t_delta * fract
        };
        Self {
            step,
            t_delta,
            t_max,
        }
    }

    /// Cross the next boundary on this axis.
    #[inline]
    pub fn advance(&mut self) {
        self.t_max += self.t_delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X * 4.0);
        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.segment_end(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn axis_step_positive() {
        let axis = AxisStep::new(0.25, 4.25);
        assert_eq!(axis.step, 1);
        assert_relative_eq!(axis.t_delta, 0.25);
        assert_relative_eq!(axis.t_max, 0.1875);
    }

    #[test]
    fn axis_step_negative() {
        let axis = AxisStep::new(10.5, 2.5);
        assert_eq!(axis.step, -1);
        assert_relative_eq!(axis.t_delta, 0.125);
        assert_relative_eq!(axis.t_max, 0.0625);
    }

    #[test]
    fn axis_step_stationary_never_crosses() {
        let axis = AxisStep::new(3.5, 3.5);
        assert_eq!(axis.step, 0);
        assert!(axis.t_max > 1.0);

        // On an exact boundary the first crossing is free, the next is not.
        let mut axis = AxisStep::new(3.0, 3.0);
        assert_relative_eq!(axis.t_max, 0.0);
        axis.advance();
        assert!(axis.t_max > 1.0);
    }
}
