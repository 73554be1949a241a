use crate::consts::EPSILON;
use crate::vector::Vector3;

/// A ray with an origin and a (by convention unit) direction.
///
/// Rays are immutable once built. The best hit found so far during a scene
/// scan lives in a separate `NearestHit` accumulator, never in the ray.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// Builds a secondary ray whose origin is nudged `EPSILON` along its
    /// own direction, so it does not immediately hit the surface it leaves.
    pub fn offset(from: Vector3, direction: Vector3) -> Ray {
        Ray { origin: from + direction * EPSILON, direction }
    }

    /// The point at distance `t` along the ray.
    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
        Vector3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn offset_ray_moves_origin_along_direction() {
    let r = Ray::offset(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(r.origin.y, EPSILON);
    assert_eq!(r.direction, Vector3::new(0.0, 1.0, 0.0));
}
