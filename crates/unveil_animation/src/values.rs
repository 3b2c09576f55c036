//! Animatable value types

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Copy {
    /// Linearly interpolate between self and other by factor t
    ///
    /// `t` is not clamped: eased factors outside 0.0-1.0 extrapolate.
    fn lerp(self, other: Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(self, other: Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for f64 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * f64::from(t)
    }

    fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self - other).abs() < f64::from(epsilon)
    }
}
