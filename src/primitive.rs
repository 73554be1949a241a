use crate::ray::Ray;
use crate::material::Material;
use crate::vector::{ Color, Vector3 };

/// The outcome of a ray/primitive intersection test.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// The ray does not reach the primitive in front of its origin.
    Miss,

    /// The ray hits the outside of the primitive.
    Front,

    /// The ray origin lies inside the primitive; the reported distance is the
    /// exit point.
    Inside,
}

impl HitKind {
    pub fn is_hit(self) -> bool {
        self != HitKind::Miss
    }
}

/// Distance reported alongside `HitKind::Miss`.
pub const NO_HIT: f64 = f64::MAX;

/// A sphere with its own material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vector3, radius: f64, material: Material) -> Sphere {
        Sphere { center, radius, material }
    }

    /// Intersects a ray with this sphere.
    ///
    /// Uses the geometric form of the quadratic: `b` is the distance along
    /// the ray to the point closest to the center, `det` the squared half
    /// chord length at that point.
    pub fn intersect(&self, ray: &Ray) -> (HitKind, f64) {
        let v = ray.origin - self.center;
        let b = -v.dot(&ray.direction);
        let c = v.dot(&v) - self.radius * self.radius;

        // Outside and heading away from the center: nothing ahead.
        if b < 0.0 && c > 0.0 {
            return (HitKind::Miss, NO_HIT);
        }

        let det = b * b - c;
        if det <= 0.0 {
            return (HitKind::Miss, NO_HIT);
        }

        let det = det.sqrt();
        let i1 = b - det;
        let i2 = b + det;

        if i2 <= 0.0 {
            (HitKind::Miss, NO_HIT)
        } else if i1 < 0.0 {
            (HitKind::Inside, i2)
        } else {
            (HitKind::Front, i1)
        }
    }

    /// The outward normal at a point on the surface.
    ///
    /// Scales by `1 / radius` instead of renormalizing, so `point` must lie
    /// on the sphere.
    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        (point - self.center) * (1.0 / self.radius)
    }
}

/// An infinite plane through `origin` with unit `normal`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub origin: Vector3,
    pub normal: Vector3,
    pub material: Material,
}

impl Plane {
    pub fn new(origin: Vector3, normal: Vector3, material: Material) -> Plane {
        Plane { origin, normal, material }
    }

    /// Intersects a ray with this plane. Rays parallel to the plane miss.
    pub fn intersect(&self, ray: &Ray) -> (HitKind, f64) {
        let denom = self.normal.dot(&ray.direction);
        if denom == 0.0 {
            return (HitKind::Miss, NO_HIT);
        }

        let dist = self.normal.dot(&(self.origin - ray.origin)) / denom;
        if dist > 0.0 {
            (HitKind::Front, dist)
        } else {
            (HitKind::Miss, NO_HIT)
        }
    }

    pub fn normal_at(&self, _point: Vector3) -> Vector3 {
        self.normal
    }
}

/// Geometry that can give a light its position and extent.
///
/// Lights are deliberately absent from this set, so a light can never wrap
/// another light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> (HitKind, f64) {
        match self {
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Plane(p) => p.intersect(ray),
        }
    }

    /// The reference position of the shape: a sphere's center or the point
    /// a plane was defined through.
    pub fn center(&self) -> Vector3 {
        match self {
            Shape::Sphere(s) => s.center,
            Shape::Plane(p) => p.origin,
        }
    }

    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        match self {
            Shape::Sphere(s) => s.normal_at(point),
            Shape::Plane(p) => p.normal_at(point),
        }
    }
}

/// A point-like light source.
///
/// Geometry queries go to the wrapped `emitter`. The light's own `color` is
/// both what a ray sees when it hits the light and the intensity the light
/// contributes to shading; the emitter's material is ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub emitter: Shape,
    pub color: Color,
}

impl Light {
    pub fn new(emitter: Shape, color: Color) -> Light {
        Light { emitter, color }
    }

    /// A small spherical light at `position`.
    pub fn point(position: Vector3, radius: f64, color: Color) -> Light {
        let glow = Sphere::new(position, radius, Material::matte(color));
        Light { emitter: Shape::Sphere(glow), color }
    }
}

/// Anything that can be placed in a `Scene`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
    Light(Light),
}

impl From<Light> for Primitive {
    fn from(light: Light) -> Primitive {
        Primitive::Light(light)
    }
}

/// Light material used for the plain accessors; lights are never shaded.
const EMITTER_MATERIAL: Material = Material {
    color: Vector3 { x: 1.0, y: 1.0, z: 1.0 },
    diffuse: 0.0,
    specular: 0.0,
    reflectivity: 0.0,
};

impl Primitive {
    pub fn sphere(center: Vector3, radius: f64, material: Material)
        -> Primitive {
        Primitive::Sphere(Sphere::new(center, radius, material))
    }

    pub fn plane(origin: Vector3, normal: Vector3, material: Material)
        -> Primitive {
        Primitive::Plane(Plane::new(origin, normal, material))
    }

    pub fn light(position: Vector3, radius: f64, color: Color) -> Primitive {
        Light::point(position, radius, color).into()
    }

    /// Whether this primitive is a light source.
    pub fn is_emitter(&self) -> bool {
        matches!(self, Primitive::Light(_))
    }

    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Primitive::Light(l) => Some(l),
            _ => None,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> (HitKind, f64) {
        match self {
            Primitive::Sphere(s) => s.intersect(ray),
            Primitive::Plane(p) => p.intersect(ray),
            Primitive::Light(l) => l.emitter.intersect(ray),
        }
    }

    pub fn center(&self) -> Vector3 {
        match self {
            Primitive::Sphere(s) => s.center,
            Primitive::Plane(p) => p.origin,
            Primitive::Light(l) => l.emitter.center(),
        }
    }

    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        match self {
            Primitive::Sphere(s) => s.normal_at(point),
            Primitive::Plane(p) => p.normal_at(point),
            Primitive::Light(l) => l.emitter.normal_at(point).normalized(),
        }
    }

    fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(s) => &s.material,
            Primitive::Plane(p) => &p.material,
            Primitive::Light(_) => &EMITTER_MATERIAL,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Primitive::Light(l) => l.color,
            _ => self.material().color,
        }
    }

    pub fn diffuse(&self) -> f64 {
        self.material().diffuse
    }

    pub fn specular(&self) -> f64 {
        self.material().specular
    }

    pub fn reflectivity(&self) -> f64 {
        self.material().reflectivity
    }
}

#[cfg(test)]
fn unit_sphere() -> Sphere {
    Sphere::new(Vector3::zero(), 1.0, Default::default())
}

#[test]
fn ray_toward_center_hits_front() {
    let s = Sphere::new(Vector3::new(1.0, 2.0, -3.0), 1.5, Default::default());
    let origin = Vector3::new(4.0, 6.0, 9.0);
    let r = Ray::new(origin, (s.center - origin).normalized());

    let (kind, dist) = s.intersect(&r);
    assert_eq!(kind, HitKind::Front);
    assert!((dist - ((origin - s.center).length() - s.radius)).abs() < 1e-9);
}

#[test]
fn ray_from_inside_reports_exit() {
    let s = unit_sphere();

    // Heading away from the center.
    let r = Ray::new(Vector3::new(0.0, 0.0, 0.5), Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(s.intersect(&r), (HitKind::Inside, 0.5));

    // Heading through the center.
    let r = Ray::new(Vector3::new(0.0, 0.0, 0.5), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(s.intersect(&r), (HitKind::Inside, 1.5));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(unit_sphere().intersect(&r).0, HitKind::Miss);
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(unit_sphere().intersect(&r), (HitKind::Miss, NO_HIT));
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Sphere::new(Vector3::new(0.0, 1.0, 0.0), 2.0, Default::default());
    let k = 2.0 / 3.0f64.sqrt();
    let n = s.normal_at(Vector3::new(k, 1.0 + k, k));

    let e = 1.0 / 3.0f64.sqrt();
    assert_eq!(n, Vector3::new(e, e, e));
}

#[test]
fn ray_intersecting_plane_from_above() {
    let p = Plane::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        Default::default());
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert_eq!(p.intersect(&r), (HitKind::Front, 1.0));
}

#[test]
fn plane_behind_ray_misses() {
    let p = Plane::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        Default::default());
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(p.intersect(&r).0, HitKind::Miss);
}

#[test]
fn parallel_ray_never_hits_plane() {
    let p = Plane::new(Vector3::new(0.0, -2.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0), Default::default());
    let dir = Vector3::new(1.0, 0.0, 1.0).normalized();

    for origin in [
        Vector3::new(0.0, 10.0, 0.0),
        Vector3::new(3.0, -2.0, -7.0),
        Vector3::new(-1.0, -50.0, 4.0),
    ] {
        assert_eq!(p.intersect(&Ray::new(origin, dir)).0, HitKind::Miss);
    }
}

#[test]
fn plane_normal_is_constant() {
    let n = Vector3::new(0.0, 0.0, 1.0);
    let p = Plane::new(Vector3::zero(), n, Default::default());

    assert_eq!(p.normal_at(Vector3::new(10.0, 0.0, -10.0)), n);
    assert_eq!(p.normal_at(Vector3::new(-5.0, 150.0, 0.0)), n);
}

#[test]
fn light_delegates_geometry_to_emitter() {
    let light = Primitive::light(Vector3::new(1.0, 0.0, 0.0), 0.5,
        Vector3::new(1.0, 0.5, 0.25));
    let r = Ray::new(Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));

    assert!(light.is_emitter());
    assert_eq!(light.intersect(&r), (HitKind::Front, 3.5));
    assert_eq!(light.center(), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(light.normal_at(Vector3::new(1.5, 0.0, 0.0)),
        Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(light.color(), Vector3::new(1.0, 0.5, 0.25));
}

#[test]
fn light_color_is_independent_of_emitter_material() {
    let glow = Sphere::new(Vector3::zero(), 0.1,
        Material::matte(Vector3::new(0.0, 0.0, 1.0)));
    let light: Primitive = Light::new(Shape::Sphere(glow), Vector3::white()).into();

    assert_eq!(light.color(), Vector3::white());
    assert_eq!(light.reflectivity(), 0.0);
}

#[test]
fn material_accessors_read_fields() {
    let m = Material::new(Vector3::new(0.2, 0.4, 0.6), 0.7, 0.3, 0.5);
    let s = Primitive::sphere(Vector3::zero(), 1.0, m);

    assert!(!s.is_emitter());
    assert_eq!(s.color(), Vector3::new(0.2, 0.4, 0.6));
    assert_eq!(s.diffuse(), 0.7);
    assert_eq!(s.specular(), 0.3);
    assert_eq!(s.reflectivity(), 0.5);
}
