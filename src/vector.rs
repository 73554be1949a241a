use std::ops::{ Add, Sub, Neg, Mul };

use serde::Deserialize;

use crate::feq;

/// A three-component vector.
///
/// The same type is used for positions, directions and linear RGB colors.
/// Nothing keeps a `Vector3` normalized; callers normalize when they need a
/// unit direction. Scene files spell vectors as `[x, y, z]`.
#[derive(Debug, Default, Copy, Clone, Deserialize)]
#[serde(from = "[f64; 3]")]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A linear RGB color stored in `x`, `y` and `z`.
pub type Color = Vector3;

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Vector3 {
        Vector3 { x: v[0], y: v[1], z: v[2] }
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    /// The zero vector, also the color black.
    pub fn zero() -> Vector3 {
        Vector3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn black() -> Color {
        Self::zero()
    }

    pub fn white() -> Color {
        Vector3 { x: 1.0, y: 1.0, z: 1.0 }
    }

    pub fn length(&self) -> f64 {
        f64::sqrt(self.dot(self))
    }

    /// Scales this vector to unit length in place.
    ///
    /// A zero vector has no direction; normalizing one yields non-finite
    /// components.
    pub fn normalize(&mut self) -> &mut Vector3 {
        let inv = 1.0 / self.length();
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;

        self
    }

    /// Returns a unit-length copy of this vector.
    pub fn normalized(&self) -> Vector3 {
        let mut v = *self;
        v.normalize();
        v
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Multiplies each component with the matching component of `other`.
    ///
    /// Used to filter a light's color through a surface color.
    pub fn mul_elementwise(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Reflects this direction about a unit normal.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - *normal * (2.0 * self.dot(normal))
    }

    /// Converts a color in `[0, 1]` to 8-bit channels.
    ///
    /// Channels are truncated, not rounded. Out-of-range channels are not
    /// corrected beforehand; the float-to-int cast saturates them at `0` and
    /// `255`.
    ///
    /// ```
    /// # use whitted_tracer::vector::Vector3;
    /// let c = Vector3::new(1.0, 0.5, 0.0);
    /// assert_eq!(c.to_color_bytes(), [255, 127, 0]);
    /// ```
    pub fn to_color_bytes(&self) -> [u8; 3] {
        [
            (self.x * 255.0) as u8,
            (self.y * 255.0) as u8,
            (self.z * 255.0) as u8,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// Scalar right-multiplication.
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Elementwise product, shorthand for `mul_elementwise`.
impl Mul<Vector3> for Vector3 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        self.mul_elementwise(&other)
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a1 = Vector3::new(3.0, -2.0, 5.0);
    let a2 = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let p1 = Vector3::new(3.0, 2.0, 1.0);
    let p2 = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector3::new(3.5, -7.0, 10.5));
    assert_eq!(a * 0.5, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn length_of_vector() {
    let v = Vector3::new(-1.0, -2.0, -3.0);

    assert_eq!(v.length(), f64::sqrt(14.0));
}

#[test]
fn normalize_in_place() {
    let mut v = Vector3::new(4.0, 0.0, 0.0);
    v.normalize();

    assert_eq!(v, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn normalized_leaves_original() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let e = Vector3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalized(), e);
    assert_eq!(v, Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn normalize_zero_is_not_finite() {
    assert!(!Vector3::zero().normalized().is_finite());
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn elementwise_product() {
    let yellow = Vector3::new(1.0, 1.0, 0.0);
    let purple = Vector3::new(1.0, 0.0, 1.0);

    assert_eq!(yellow * purple, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn color_bytes_truncate_and_saturate() {
    assert_eq!(Vector3::new(0.999, 0.0, 0.5).to_color_bytes(), [254, 0, 127]);
    assert_eq!(Vector3::new(1.7, -0.3, 0.0).to_color_bytes(), [255, 0, 0]);
}

#[test]
fn vector_from_json_array() {
    let v: Vector3 = serde_json::from_str("[1, 2.5, -3]").unwrap();
    assert_eq!(v, Vector3::new(1.0, 2.5, -3.0));

    assert!(serde_json::from_str::<Vector3>("[1, 2]").is_err());
}
