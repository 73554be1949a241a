use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::{ debug, warn };
use serde::Deserialize;

use crate::ray::Ray;
use crate::camera::{ Camera, Projection };
use crate::consts::{ DEFAULT_FOV_DEGREES, DEFAULT_HEIGHT, DEFAULT_WIDTH };
use crate::error::SceneError;
use crate::intersect::{ Intersection, NearestHit };
use crate::material::Material;
use crate::primitive::{ Light, Plane, Primitive, Shape, Sphere };
use crate::vector::Vector3;

/// An immutable collection of primitives plus the camera viewing them.
///
/// Primitive order matters only as the tie-break between exactly equidistant
/// hits. The list of lights is derived once at construction; nothing can
/// change the scene afterwards, so it can be shared freely between render
/// workers.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    pub camera: Camera,
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>, camera: Camera) -> Scene {
        let lights: Vec<Light> = primitives.iter()
            .filter_map(|p| p.as_light().copied())
            .collect();

        debug!("Scene holds {} primitives, {} of them lights.",
            primitives.len(), lights.len());
        if lights.is_empty() {
            warn!("Scene has no lights; every shaded surface will be black.");
        }

        Scene { primitives, lights, camera }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The light sources, in scene order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Finds the closest primitive along `ray`, lights included.
    pub fn nearest(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut nearest = NearestHit::new();
        for prim in self.primitives.iter() {
            nearest.offer(prim, ray);
        }

        nearest.into_hit()
    }

    /// Determines whether any non-light primitive sits on `ray` closer than
    /// `max_distance`.
    pub fn occluded(&self, ray: &Ray, max_distance: f64) -> bool {
        self.primitives.iter()
            .filter(|p| !p.is_emitter())
            .any(|p| NearestHit::within(max_distance).offer(p, ray))
    }

    /// A small room: five spheres between four colored walls, lit by one
    /// small white light and viewed from `(0, 0, 3)`.
    pub fn demo() -> Scene {
        let green = Vector3::new(0.0, 1.0, 0.0);
        let white = Vector3::white();
        let glossy = |color| Material::new(color, 0.8, 0.5, 0.1);

        let primitives = vec![
            Primitive::sphere(Vector3::zero(), 0.3, glossy(green)),
            Primitive::sphere(Vector3::new(-0.8, 0.0, 0.0), 0.1,
                Material::new(green, 0.9, 0.5, 0.1)),
            Primitive::sphere(Vector3::new(1.0, -1.1, -0.41), 0.3,
                glossy(green)),
            Primitive::sphere(Vector3::new(-1.0, 1.0, -1.0), 0.6,
                Material::new(white, 0.4, 0.5, 0.8)),
            Primitive::sphere(Vector3::new(-1.0, -1.0, -1.0), 0.6,
                Material::new(white, 0.4, 0.5, 0.8)),

            Primitive::plane(Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(-1.0, 0.0, 0.0),
                Material::matte(Vector3::new(0.0, 0.0, 1.0))),
            Primitive::plane(Vector3::new(-2.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Material::matte(Vector3::new(1.0, 0.0, 1.0))),
            Primitive::plane(Vector3::new(0.0, 0.0, -2.0),
                Vector3::new(0.0, 0.0, 1.0), Material::matte(white)),
            Primitive::plane(Vector3::new(0.0, -2.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0), Material::matte(white)),

            Primitive::light(Vector3::new(1.0, 0.0, 0.0), 0.05, white),
        ];

        let camera = Camera::new(Vector3::new(0.0, 0.0, 3.0), Vector3::zero());
        Scene::new(primitives, camera)
    }

    /// Parses a JSON scene description.
    pub fn from_json(json: &str) -> Result<(Scene, RenderSettings), SceneError> {
        let file: SceneFile = serde_json::from_str(json)?;
        file.into_scene()
    }

    /// Reads and parses a JSON scene file.
    pub fn load(path: &Path) -> Result<(Scene, RenderSettings), SceneError> {
        let json = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded scene description from {}.", path.display());
        Self::from_json(&json)
    }
}

/// Image size, field of view and worker count for a render.
///
/// Every field is optional in a scene file; missing fields take the crate
/// defaults.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,

    /// Field of view in degrees.
    pub field_of_view: f64,

    /// Worker thread count; `None` means one per available core.
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            field_of_view: DEFAULT_FOV_DEGREES,
            threads: None,
        }
    }
}

impl RenderSettings {
    pub fn projection(&self) -> Projection {
        Projection::new(self.width, self.height, self.field_of_view)
    }

    /// The configured thread count, or the available parallelism.
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// The on-disk scene format.
///
/// ```json
/// {
///   "camera": { "location": [0, 0, 3], "points_at": [0, 0, 0] },
///   "settings": { "width": 256, "height": 256, "field_of_view": 70 },
///   "primitives": [
///     { "type": "sphere", "center": [0, 0, 0], "radius": 0.3,
///       "material": { "color": [0, 1, 0], "diffuse": 0.8 } },
///     { "type": "light", "color": [1, 1, 1],
///       "emitter": { "type": "sphere", "center": [1, 0, 0], "radius": 0.05 } }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct SceneFile {
    camera: CameraJson,

    #[serde(default)]
    settings: RenderSettings,

    primitives: Vec<PrimitiveJson>,
}

impl SceneFile {
    fn into_scene(self) -> Result<(Scene, RenderSettings), SceneError> {
        let primitives = self.primitives.into_iter()
            .map(Primitive::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let camera = self.camera.into();
        Ok((Scene::new(primitives, camera), self.settings))
    }
}

#[derive(Clone, Debug, Deserialize)]
struct CameraJson {
    location: Vector3,

    #[serde(default)]
    points_at: Option<Vector3>,

    /// Turn the camera towards `points_at` instead of looking down `-z`.
    #[serde(default)]
    orient: bool,

    #[serde(default = "default_up")]
    up: Vector3,
}

fn default_up() -> Vector3 {
    Vector3::new(0.0, 1.0, 0.0)
}

impl From<CameraJson> for Camera {
    fn from(json: CameraJson) -> Camera {
        let points_at = json.points_at
            .unwrap_or(json.location + Vector3::new(0.0, 0.0, -1.0));

        if json.orient {
            Camera::looking_at(json.location, points_at, json.up)
        } else {
            Camera::new(json.location, points_at)
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PrimitiveJson {
    Sphere(SphereJson),
    Plane(PlaneJson),
    Light {
        color: Vector3,
        emitter: ShapeJson,
    },
}

/// Geometry accepted as a light emitter; `"light"` is not a valid tag here.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeJson {
    Sphere(SphereJson),
    Plane(PlaneJson),
}

#[derive(Clone, Debug, Deserialize)]
struct SphereJson {
    center: Vector3,
    radius: f64,

    #[serde(default)]
    material: Material,
}

#[derive(Clone, Debug, Deserialize)]
struct PlaneJson {
    origin: Vector3,
    normal: Vector3,

    #[serde(default)]
    material: Material,
}

fn validate_material(m: Material) -> Result<Material, SceneError> {
    if !(0.0..=1.0).contains(&m.reflectivity) {
        return Err(SceneError::InvalidReflectivity(m.reflectivity));
    }

    Ok(m)
}

impl TryFrom<SphereJson> for Sphere {
    type Error = SceneError;

    fn try_from(json: SphereJson) -> Result<Sphere, SceneError> {
        if !(json.radius > 0.0 && json.radius.is_finite()) {
            return Err(SceneError::InvalidRadius(json.radius));
        }

        let material = validate_material(json.material)?;
        Ok(Sphere::new(json.center, json.radius, material))
    }
}

impl TryFrom<PlaneJson> for Plane {
    type Error = SceneError;

    fn try_from(json: PlaneJson) -> Result<Plane, SceneError> {
        let length = json.normal.length();
        if !(length > 0.0 && length.is_finite()) {
            return Err(SceneError::DegenerateNormal);
        }

        let material = validate_material(json.material)?;
        Ok(Plane::new(json.origin, json.normal.normalized(), material))
    }
}

impl TryFrom<ShapeJson> for Shape {
    type Error = SceneError;

    fn try_from(json: ShapeJson) -> Result<Shape, SceneError> {
        Ok(match json {
            ShapeJson::Sphere(s) => Shape::Sphere(Sphere::try_from(s)?),
            ShapeJson::Plane(p) => Shape::Plane(Plane::try_from(p)?),
        })
    }
}

impl TryFrom<PrimitiveJson> for Primitive {
    type Error = SceneError;

    fn try_from(json: PrimitiveJson) -> Result<Primitive, SceneError> {
        Ok(match json {
            PrimitiveJson::Sphere(s) => Primitive::Sphere(Sphere::try_from(s)?),
            PrimitiveJson::Plane(p) => Primitive::Plane(Plane::try_from(p)?),
            PrimitiveJson::Light { color, emitter } =>
                Light::new(Shape::try_from(emitter)?, color).into(),
        })
    }
}

#[test]
fn lights_are_indexed_in_order() {
    let s = Scene::demo();

    assert_eq!(s.primitives().len(), 10);
    assert_eq!(s.lights().len(), 1);
    assert_eq!(s.lights()[0].emitter.center(), Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn nearest_hit_includes_lights() {
    let scene = Scene::new(vec![
        Primitive::sphere(Vector3::new(0.0, 0.0, -10.0), 1.0, Default::default()),
        Primitive::light(Vector3::new(0.0, 0.0, -3.0), 0.5, Vector3::white()),
    ], Camera::default());

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let hit = scene.nearest(&r).unwrap();

    assert!(hit.what.is_emitter());
    assert_eq!(hit.t, 2.5);
}

#[test]
fn nearest_miss_is_none() {
    let scene = Scene::demo();
    let r = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 1.0));

    assert!(scene.nearest(&r).is_none());
}

#[test]
fn occlusion_ignores_lights_and_far_hits() {
    let scene = Scene::new(vec![
        Primitive::light(Vector3::new(0.0, 2.0, 0.0), 0.5, Vector3::white()),
        Primitive::sphere(Vector3::new(0.0, 10.0, 0.0), 1.0, Default::default()),
    ], Camera::default());

    let up = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert!(!scene.occluded(&up, 5.0));
    assert!(scene.occluded(&up, 20.0));
}

#[test]
fn scene_from_json() {
    let json = r#"{
        "camera": { "location": [0, 0, 3], "points_at": [0, 0, 0] },
        "settings": { "width": 64, "height": 32 },
        "primitives": [
            { "type": "sphere", "center": [0, 0, 0], "radius": 0.5,
              "material": { "color": [1, 0, 0], "diffuse": 0.7 } },
            { "type": "plane", "origin": [0, -1, 0], "normal": [0, 3, 0] },
            { "type": "light", "color": [1, 1, 1],
              "emitter": { "type": "sphere", "center": [2, 2, 2], "radius": 0.1 } }
        ]
    }"#;

    let (scene, settings) = Scene::from_json(json).unwrap();

    assert_eq!(settings.width, 64);
    assert_eq!(settings.height, 32);
    assert_eq!(settings.field_of_view, DEFAULT_FOV_DEGREES);
    assert_eq!(scene.camera.location, Vector3::new(0.0, 0.0, 3.0));
    assert_eq!(scene.primitives().len(), 3);
    assert_eq!(scene.lights().len(), 1);

    match scene.primitives()[1] {
        Primitive::Plane(p) => assert_eq!(p.normal, Vector3::new(0.0, 1.0, 0.0)),
        ref other => panic!("expected a plane, got {:?}", other),
    }
}

#[test]
fn light_cannot_wrap_light() {
    let json = r#"{
        "camera": { "location": [0, 0, 3] },
        "primitives": [
            { "type": "light", "color": [1, 1, 1],
              "emitter": { "type": "light", "color": [1, 1, 1],
                "emitter": { "type": "sphere", "center": [0, 0, 0], "radius": 1 } } }
        ]
    }"#;

    assert!(matches!(Scene::from_json(json), Err(SceneError::Json(_))));
}

#[test]
fn invalid_geometry_is_rejected() {
    let zero_radius = r#"{
        "camera": { "location": [0, 0, 3] },
        "primitives": [ { "type": "sphere", "center": [0, 0, 0], "radius": 0 } ]
    }"#;
    let flat_normal = r#"{
        "camera": { "location": [0, 0, 3] },
        "primitives": [ { "type": "plane", "origin": [0, 0, 0], "normal": [0, 0, 0] } ]
    }"#;
    let too_shiny = r#"{
        "camera": { "location": [0, 0, 3] },
        "primitives": [ { "type": "sphere", "center": [0, 0, 0], "radius": 1,
            "material": { "reflectivity": 1.5 } } ]
    }"#;

    assert!(matches!(Scene::from_json(zero_radius),
        Err(SceneError::InvalidRadius(_))));
    assert!(matches!(Scene::from_json(flat_normal),
        Err(SceneError::DegenerateNormal)));
    assert!(matches!(Scene::from_json(too_shiny),
        Err(SceneError::InvalidReflectivity(_))));
}

#[test]
fn missing_scene_file_reports_path() {
    let path = Path::new("/nonexistent/whitted/scene.json");

    match Scene::load(path) {
        Err(SceneError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected an io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn settings_fall_back_to_available_parallelism() {
    let explicit = RenderSettings { threads: Some(3), ..Default::default() };
    assert_eq!(explicit.worker_count(), 3);
    assert!(RenderSettings::default().worker_count() >= 1);
}

#[test]
fn bundled_demo_file_matches_builtin_demo() {
    let json = include_str!("../scenes/demo.json");
    let (scene, settings) = Scene::from_json(json).unwrap();
    let demo = Scene::demo();

    assert_eq!(scene.primitives(), demo.primitives());
    assert_eq!(scene.camera, demo.camera);
    assert_eq!(settings, RenderSettings::default());
}
