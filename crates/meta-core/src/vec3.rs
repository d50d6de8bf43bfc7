use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A three-lane `f64` vector used for positions, velocities, and rotations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X lane.
    pub x: f64,
    /// Y lane.
    pub y: f64,
    /// Z lane.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Construct a vector from its three lanes.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A vector with every lane set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Apply `f` lane-wise to `self` and `other`.
    pub fn zip_with(self, other: Vec3, f: impl Fn(f64, f64) -> f64) -> Vec3 {
        Vec3::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    /// Largest absolute lane difference between two vectors.
    pub fn max_abs_diff(self, other: Vec3) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Whether every lane is within `tolerance` of `other`.
    pub fn approx_eq(self, other: Vec3, tolerance: f64) -> bool {
        self.max_abs_diff(other) <= tolerance
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "({:.p$}, {:.p$}, {:.p$})", self.x, self.y, self.z),
            None => write!(f, "({}, {}, {})", self.x, self.y, self.z),
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        self.zip_with(Vec3::splat(rhs), |a, b| a * b)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f64) -> Vec3 {
        self.zip_with(Vec3::splat(rhs), |a, b| a / b)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_and_scale() {
        let v = Vec3::new(1.0, 2.0, 3.0) + Vec3::splat(1.0);
        assert_eq!(v, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(v * 0.5, Vec3::new(1.0, 1.5, 2.0));
    }

    #[test]
    fn division_by_zero_is_ieee() {
        let v = Vec3::new(1.0, -1.0, 0.0) / 0.0;
        assert_eq!(v.x, f64::INFINITY);
        assert_eq!(v.y, f64::NEG_INFINITY);
        assert!(v.z.is_nan());
    }

    #[test]
    fn display_with_precision() {
        let v = Vec3::new(0.1, 0.25, 2.0);
        assert_eq!(format!("{v:.2}"), "(0.10, 0.25, 2.00)");
        assert_eq!(v.to_string(), "(0.1, 0.25, 2)");
    }

    #[test]
    fn approx_eq_tolerance() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        assert!(a.approx_eq(Vec3::new(1.0 + 1e-12, 1.0, 1.0), 1e-9));
        assert!(!a.approx_eq(Vec3::new(1.1, 1.0, 1.0), 1e-9));
    }

    fn lane() -> impl Strategy<Value = f64> {
        -1.0e6f64..1.0e6
    }

    fn vec3() -> impl Strategy<Value = Vec3> {
        (lane(), lane(), lane()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn doubling_matches_self_addition(v in vec3()) {
            prop_assert_eq!(v * 2.0, v + v);
        }

        #[test]
        fn negated_addition_is_subtraction(a in vec3(), b in vec3()) {
            prop_assert_eq!(a + -b, a - b);
            prop_assert_eq!(a - a, Vec3::ZERO);
        }

        #[test]
        fn max_abs_diff_is_symmetric(a in vec3(), b in vec3()) {
            prop_assert_eq!(a.max_abs_diff(b), b.max_abs_diff(a));
            prop_assert!(a.approx_eq(b, a.max_abs_diff(b)));
        }
    }
}
