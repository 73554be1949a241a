use std::ops::{ Index, IndexMut };

use crate::feq;
use crate::vector::Vector3;

/// A 4x4 affine transform, stored row-major.
///
/// Points and directions are treated as column vectors multiplied on the
/// right. Points carry an implicit `w = 1` (translation applies) and
/// directions an implicit `w = 0` (translation is ignored).
#[derive(Copy, Clone, Debug)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

/// Element-wise approximate equality.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Offsets points by `x`, `y` and `z`.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Builds a camera-to-world orientation looking from `from` towards `to`.
    ///
    /// Camera space looks down `-z` with `+y` up. The columns of the result
    /// are the camera's right, up and backward axes expressed in world space,
    /// followed by the translation to `from`. Returns the pure translation
    /// when `from` and `to` coincide or `up` is parallel to the view.
    pub fn look_at(from: Vector3, to: Vector3, up: Vector3) -> Matrix4D {
        let forward = to - from;
        let right = forward.cross(&up);
        if forward.length() == 0.0 || right.length() == 0.0 {
            return Matrix4D::translation(from.x, from.y, from.z);
        }

        let forward = forward.normalized();
        let right = right.normalized();
        let true_up = right.cross(&forward);

        let mut m = Matrix4D::translation(from.x, from.y, from.z);
        m[(0, 0)] = right.x;
        m[(1, 0)] = right.y;
        m[(2, 0)] = right.z;

        m[(0, 1)] = true_up.x;
        m[(1, 1)] = true_up.y;
        m[(2, 1)] = true_up.z;

        m[(0, 2)] = -forward.x;
        m[(1, 2)] = -forward.y;
        m[(2, 2)] = -forward.z;

        m
    }

    /// Transforms a point, applying translation.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let mut buf = [0.0; 4];
        for (r, out) in buf.iter_mut().enumerate() {
            *out = self[(r, 0)] * p.x
                + self[(r, 1)] * p.y
                + self[(r, 2)] * p.z
                + self[(r, 3)];
        }

        // Affine matrices keep w at 1, but honor a projective row anyway.
        let w = buf[3];
        if w != 0.0 && w != 1.0 {
            Vector3::new(buf[0] / w, buf[1] / w, buf[2] / w)
        } else {
            Vector3::new(buf[0], buf[1], buf[2])
        }
    }

    /// Transforms a direction, ignoring translation.
    pub fn transform_direction(&self, d: Vector3) -> Vector3 {
        Vector3::new(
            self[(0, 0)] * d.x + self[(0, 1)] * d.y + self[(0, 2)] * d.z,
            self[(1, 0)] * d.x + self[(1, 1)] * d.y + self[(1, 2)] * d.z,
            self[(2, 0)] * d.x + self[(2, 1)] * d.y + self[(2, 2)] * d.z,
        )
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index.0 * 4 + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[index.0 * 4 + index.1]
    }
}

#[test]
fn identity_keeps_points_and_directions() {
    let m = Matrix4D::identity();
    let p = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(m.transform_point(p), p);
    assert_eq!(m.transform_direction(p), p);
}

#[test]
fn translation_moves_points_not_directions() {
    let m = Matrix4D::translation(5.0, -3.0, 2.0);
    let v = Vector3::new(-3.0, 4.0, 5.0);

    assert_eq!(m.transform_point(v), Vector3::new(2.0, 1.0, 7.0));
    assert_eq!(m.transform_direction(v), v);
}

#[test]
fn look_at_down_negative_z_is_translation() {
    let from = Vector3::new(0.0, 0.0, 3.0);
    let m = Matrix4D::look_at(from, Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(m, Matrix4D::translation(0.0, 0.0, 3.0));
}

#[test]
fn look_at_turns_forward_axis() {
    let m = Matrix4D::look_at(
        Vector3::zero(),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    );

    let forward = m.transform_direction(Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(forward, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn look_at_degenerate_up_falls_back() {
    let from = Vector3::new(1.0, 1.0, 1.0);
    let m = Matrix4D::look_at(from, Vector3::new(1.0, 5.0, 1.0),
        Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(m, Matrix4D::translation(1.0, 1.0, 1.0));
}
