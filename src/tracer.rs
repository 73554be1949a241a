use crate::ray::Ray;
use crate::scene::Scene;
use crate::primitive::{ Light, Primitive };
use crate::vector::{ Color, Vector3 };
use crate::consts::{ MAX_TRACE_DEPTH, SHININESS };

/// Traces `ray` through `scene` and returns the linear color it carries.
///
/// Rays that hit nothing are black, and rays that hit a light take the
/// light's color unshaded. Any other hit gathers diffuse and specular light
/// from every unoccluded light, then follows one mirror bounce if the surface
/// is reflective and `depth` is still below `MAX_TRACE_DEPTH`. Callers start
/// at depth `0`.
///
/// The result is not clamped; channels above `1.0` are possible.
pub fn raytrace(ray: &Ray, scene: &Scene, depth: usize) -> Color {
    let hit = match scene.nearest(ray) {
        Some(hit) => hit,
        None => return Color::black(),
    };

    let prim = hit.what;
    if prim.is_emitter() {
        return prim.color();
    }

    let point = ray.position(hit.t);
    let normal = prim.normal_at(point);

    let mut color = Color::black();
    for light in scene.lights() {
        color = color
            + shade_light(scene, prim, light, point, normal, ray.direction);
    }

    let reflectivity = prim.reflectivity();
    if reflectivity > 0.0 && depth < MAX_TRACE_DEPTH {
        let reflectv = ray.direction.reflect(&normal);
        let reflected = raytrace(&Ray::offset(point, reflectv), scene, depth + 1);
        color = color + reflected * prim.color() * reflectivity;
    }

    color
}

/// The contribution of one light at a shading point, shadows included.
fn shade_light(scene: &Scene, prim: &Primitive, light: &Light,
    point: Vector3, normal: Vector3, view: Vector3) -> Color {
    let to_light = light.emitter.center() - point;
    let distance = to_light.length();
    let lightv = to_light.normalized();

    let in_shadow = is_shadowed(scene, point, lightv, distance);
    lighting(prim, light, lightv, normal, view, in_shadow)
}

/// Determines whether a point is cut off from a light `distance` away in
/// direction `lightv`. Other lights never cast shadows.
pub fn is_shadowed(scene: &Scene, point: Vector3, lightv: Vector3,
    distance: f64) -> bool {
    scene.occluded(&Ray::offset(point, lightv), distance)
}

/// Diffuse plus specular light from `light` on `prim`.
///
/// `lightv` is the unit direction from the surface to the light, `view` the
/// incoming ray direction. A shadowed point receives nothing from this light.
pub fn lighting(prim: &Primitive, light: &Light, lightv: Vector3,
    normal: Vector3, view: Vector3, in_shadow: bool) -> Color {
    if in_shadow {
        return Color::black();
    }

    let mut color = Color::black();

    let light_dot_normal = lightv.dot(&normal);
    if light_dot_normal > 0.0 {
        color = color + light.color * prim.color()
            * (light_dot_normal * prim.diffuse());
    }

    // Phong: the light mirrored through the surface, seen along the view ray.
    let reflectv = lightv.reflect(&normal);
    let reflect_dot_view = view.dot(&reflectv);
    if reflect_dot_view > 0.0 {
        color = color + light.color
            * (reflect_dot_view.powf(SHININESS) * prim.specular());
    }

    color
}

#[cfg(test)]
use crate::camera::Camera;
#[cfg(test)]
use crate::material::Material;
#[cfg(test)]
use crate::primitive::{ Shape, Sphere };

#[cfg(test)]
fn floor_under_light(blocker: bool) -> Scene {
    let mut primitives = vec![
        Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
            Material::new(Vector3::white(), 0.8, 0.0, 0.0)),
        Primitive::light(Vector3::new(0.0, 5.0, 0.0), 0.1, Vector3::white()),
    ];

    if blocker {
        primitives.push(Primitive::sphere(Vector3::new(0.0, 3.0, 0.0), 0.5,
            Default::default()));
    }

    Scene::new(primitives, Camera::default())
}

#[test]
fn miss_is_black() {
    let scene = floor_under_light(false);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

    assert_eq!(raytrace(&r, &scene, 0), Color::black());
}

#[test]
fn direct_hit_on_light_is_light_color() {
    let scene = Scene::new(vec![
        Primitive::light(Vector3::new(0.0, 0.0, -5.0), 1.0,
            Vector3::new(0.9, 0.8, 0.7)),
    ], Camera::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(raytrace(&r, &scene, 0), Vector3::new(0.9, 0.8, 0.7));
}

#[test]
fn diffuse_from_overhead_light() {
    let scene = floor_under_light(false);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert_eq!(raytrace(&r, &scene, 0), Vector3::new(0.8, 0.8, 0.8));
}

#[test]
fn blocker_casts_hard_shadow() {
    let lit = floor_under_light(false);
    let shadowed = floor_under_light(true);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert!(raytrace(&r, &lit, 0).x > 0.0);
    assert_eq!(raytrace(&r, &shadowed, 0), Color::black());
}

#[test]
fn shadowed_point_gets_no_specular() {
    let prim = Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        Material::new(Vector3::white(), 1.0, 1.0, 0.0));
    let light = Light::point(Vector3::new(0.0, 5.0, 0.0), 0.1, Vector3::white());
    let up = Vector3::new(0.0, 1.0, 0.0);
    let down = Vector3::new(0.0, -1.0, 0.0);

    assert_eq!(lighting(&prim, &light, up, up, down, false),
        Vector3::new(2.0, 2.0, 2.0));
    assert_eq!(lighting(&prim, &light, up, up, down, true), Color::black());
}

#[test]
fn specular_needs_aligned_view() {
    let prim = Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        Material::new(Vector3::white(), 0.0, 1.0, 0.0));
    let light = Light::point(Vector3::new(0.0, 5.0, 0.0), 0.1, Vector3::white());
    let up = Vector3::new(0.0, 1.0, 0.0);

    // Grazing view: the mirrored light direction points straight down.
    let grazing = Vector3::new(1.0, 0.0, 0.0);
    assert_eq!(lighting(&prim, &light, up, up, grazing, false), Color::black());

    // 45 degrees off: cos = sqrt(2)/2, raised to the 20th power.
    let oblique = Vector3::new(1.0, -1.0, 0.0).normalized();
    let e = (2.0f64.sqrt() / 2.0).powf(SHININESS);
    assert_eq!(lighting(&prim, &light, up, up, oblique, false),
        Vector3::new(e, e, e));
}

#[test]
fn facing_mirrors_terminate() {
    let mirror = Material::new(Vector3::white(), 0.5, 0.0, 1.0);
    let scene = Scene::new(vec![
        Primitive::sphere(Vector3::new(0.0, 0.0, -3.0), 1.0, mirror),
        Primitive::sphere(Vector3::new(0.0, 0.0, 3.0), 1.0, mirror),
        Primitive::light(Vector3::new(5.0, 5.0, 0.0), 0.1, Vector3::white()),
    ], Camera::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let c = raytrace(&r, &scene, 0);
    assert!(c.is_finite());
    assert!(c.x > 0.0);
}

#[test]
fn no_reflection_at_max_depth() {
    let shiny = Material::new(Vector3::white(), 0.5, 0.0, 1.0);
    let matte = Material { reflectivity: 0.0, ..shiny };
    let build = |m| Scene::new(vec![
        Primitive::sphere(Vector3::new(0.0, 0.0, -3.0), 1.0, m),
        Primitive::sphere(Vector3::new(0.0, 0.0, 3.0), 1.0, m),
        Primitive::light(Vector3::new(5.0, 5.0, 0.0), 0.1, Vector3::white()),
    ], Camera::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let capped = raytrace(&r, &build(shiny), MAX_TRACE_DEPTH);
    let local = raytrace(&r, &build(matte), 0);
    assert_eq!(capped, local);

    // One level above the cap still picks up the other mirror.
    let bounced = raytrace(&r, &build(shiny), MAX_TRACE_DEPTH - 1);
    assert!(bounced.x > capped.x);
}

#[test]
fn red_sphere_lit_from_camera_side() {
    let scene = Scene::new(vec![
        Primitive::sphere(Vector3::new(0.0, 0.0, -1.0), 1.0,
            Material::matte(Vector3::new(1.0, 0.0, 0.0))),
        Primitive::light(Vector3::new(0.0, 0.5, 2.0), 0.1, Vector3::white()),
    ], Camera::default());
    let r = Ray::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0));

    let c = raytrace(&r, &scene, 0);
    assert!(c.x > 0.0);
    assert_eq!(c.y, 0.0);
    assert_eq!(c.z, 0.0);
}

#[test]
fn light_color_tints_diffuse_shading() {
    // The emitter's own blue material must not leak into the shading.
    let glow = Sphere::new(Vector3::new(0.0, 5.0, 0.0), 0.1,
        Material::matte(Vector3::new(0.0, 0.0, 1.0)));
    let red = Light::new(Shape::Sphere(glow),
        Vector3::new(1.0, 0.0, 0.0));

    let scene = Scene::new(vec![
        Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
            Material::new(Vector3::white(), 1.0, 0.0, 0.0)),
        red.into(),
    ], Camera::default());

    let down = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    assert_eq!(raytrace(&down, &scene, 0), Vector3::new(1.0, 0.0, 0.0));

    let up = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(raytrace(&up, &scene, 0), Vector3::new(1.0, 0.0, 0.0));
}
