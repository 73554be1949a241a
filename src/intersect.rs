use crate::ray::Ray;
use crate::primitive::{ HitKind, Primitive, NO_HIT };

/// An accepted intersection.
///
/// `what` borrows the primitive from the scene; `t` is the distance along the
/// ray and `kind` says whether the ray started inside the primitive.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub kind: HitKind,
    pub what: &'a Primitive,
}

/// Running "closest hit so far" for a linear scan over primitives.
///
/// The bound starts at `NO_HIT` (the largest representable distance), or at
/// an explicit limit for shadow rays. A candidate is kept only if it is
/// strictly closer than the current bound, so on exactly equal distances the
/// first primitive offered wins.
#[derive(Clone, Debug)]
pub struct NearestHit<'a> {
    bound: f64,
    best: Option<Intersection<'a>>,
}

impl<'a> NearestHit<'a> {
    pub fn new() -> NearestHit<'a> {
        NearestHit { bound: NO_HIT, best: None }
    }

    /// Starts with an explicit upper bound; hits at or beyond it are ignored.
    pub fn within(max_distance: f64) -> NearestHit<'a> {
        NearestHit { bound: max_distance, best: None }
    }

    /// Tests `prim` against `ray` and keeps it if it is strictly closer.
    ///
    /// Returns whether the candidate was accepted.
    pub fn offer(&mut self, prim: &'a Primitive, ray: &Ray) -> bool {
        let (kind, t) = prim.intersect(ray);
        if !kind.is_hit() || t >= self.bound {
            return false;
        }

        self.bound = t;
        self.best = Some(Intersection { t, kind, what: prim });
        true
    }

    pub fn into_hit(self) -> Option<Intersection<'a>> {
        self.best
    }
}

#[cfg(test)]
use crate::vector::Vector3;

#[test]
fn nearest_of_several_spheres() {
    let far = Primitive::sphere(Vector3::new(0.0, 0.0, -10.0), 1.0,
        Default::default());
    let near = Primitive::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0,
        Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let mut nearest = NearestHit::new();
    assert!(nearest.offer(&far, &r));
    assert!(nearest.offer(&near, &r));

    let hit = nearest.into_hit().unwrap();
    assert!(std::ptr::eq(hit.what, &near));
    assert_eq!(hit.t, 3.0);
    assert_eq!(hit.kind, HitKind::Front);
}

#[test]
fn farther_hit_is_rejected() {
    let near = Primitive::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0,
        Default::default());
    let far = Primitive::sphere(Vector3::new(0.0, 0.0, -10.0), 1.0,
        Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let mut nearest = NearestHit::new();
    assert!(nearest.offer(&near, &r));
    assert!(!nearest.offer(&far, &r));
    assert!(std::ptr::eq(nearest.into_hit().unwrap().what, &near));
}

#[test]
fn equal_distance_keeps_first() {
    let a = Primitive::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0,
        Default::default());
    let b = a;
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let mut nearest = NearestHit::new();
    nearest.offer(&a, &r);
    assert!(!nearest.offer(&b, &r));
    assert!(std::ptr::eq(nearest.into_hit().unwrap().what, &a));
}

#[test]
fn bounded_scan_ignores_hits_past_limit() {
    let s = Primitive::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0,
        Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert!(!NearestHit::within(2.5).offer(&s, &r));
    assert!(NearestHit::within(3.5).offer(&s, &r));
}
