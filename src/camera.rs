use crate::ray::Ray;
use crate::vector::Vector3;
use crate::matrix::Matrix4D;

/// A pinhole camera.
///
/// `points_at` records where the camera is aimed. Only `Camera::looking_at`
/// turns it into an orientation; `Camera::new` keeps the identity orientation
/// (looking down `-z`) and just moves the eye to `location`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub location: Vector3,
    pub points_at: Vector3,

    /// Camera-to-world transform. The camera sits at the origin of camera
    /// space, so this always maps the origin to `location`.
    to_world: Matrix4D,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0))
    }
}

impl Camera {
    /// A camera at `location` with the identity orientation.
    pub fn new(location: Vector3, points_at: Vector3) -> Camera {
        let to_world =
            Matrix4D::translation(location.x, location.y, location.z);

        Camera { location, points_at, to_world }
    }

    /// A camera at `location` turned to face `points_at`, with `up` as the
    /// approximate up direction.
    pub fn looking_at(location: Vector3, points_at: Vector3, up: Vector3)
        -> Camera {
        let to_world = Matrix4D::look_at(location, points_at, up);

        Camera { location, points_at, to_world }
    }

    pub fn to_world(&self) -> &Matrix4D {
        &self.to_world
    }
}

/// The image plane for a `width` x `height` render.
///
/// Pixel `(0, 0)` is the top-left corner. The plane sits at `z = -1` in
/// camera space; its vertical half-extent is `tan(fov / 2)` and the
/// horizontal half-extent is that times the aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub width: usize,
    pub height: usize,

    /// Field of view in degrees.
    pub field_of_view: f64,

    angle: f64,
    aspect: f64,
}

impl Projection {
    pub fn new(width: usize, height: usize, field_of_view: f64)
        -> Projection {
        let angle = (field_of_view.to_radians() / 2.0).tan();
        let aspect = width as f64 / height as f64;

        Projection { width, height, field_of_view, angle, aspect }
    }

    /// Builds the primary ray through the center of pixel `(px, py)`.
    ///
    /// Pure: the same pixel, camera and projection always produce the same
    /// ray.
    pub fn ray_for_pixel(&self, camera: &Camera, px: usize, py: usize) -> Ray {
        let screen_x = (px as f64 + 0.5) / self.width as f64;
        let screen_y = (py as f64 + 0.5) / self.height as f64;

        let u = (2.0 * screen_x - 1.0) * self.angle * self.aspect;
        let v = (1.0 - 2.0 * screen_y) * self.angle;

        let to_world = camera.to_world();
        let origin = to_world.transform_point(Vector3::zero());
        let direction = to_world
            .transform_direction(Vector3::new(u, v, -1.0))
            .normalized();

        Ray::new(origin, direction)
    }
}

#[test]
fn ray_through_center() {
    let c = Camera::default();
    let p = Projection::new(201, 101, 90.0);
    let r = p.ray_for_pixel(&c, 100, 50);

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_top_left_corner() {
    let c = Camera::default();
    let p = Projection::new(2, 2, 90.0);
    let r = p.ray_for_pixel(&c, 0, 0);

    // tan(45) = 1, so the pixel center sits at (-0.5, 0.5, -1).
    let e = Vector3::new(-0.5, 0.5, -1.0).normalized();
    assert_eq!(r.direction, e);
}

#[test]
fn aspect_ratio_widens_horizontal_extent() {
    let c = Camera::default();
    let p = Projection::new(4, 2, 90.0);
    let r = p.ray_for_pixel(&c, 3, 1);

    // u = (2 * 3.5/4 - 1) * 1 * 2 = 1.5, v = (1 - 2 * 1.5/2) * 1 = -0.5
    let e = Vector3::new(1.5, -0.5, -1.0).normalized();
    assert_eq!(r.direction, e);
}

#[test]
fn ray_starts_at_camera_location() {
    let c = Camera::new(Vector3::new(0.0, 0.0, 3.0), Vector3::zero());
    let p = Projection::new(16, 16, 70.0);

    for (x, y) in [(0, 0), (7, 9), (15, 15)] {
        assert_eq!(p.ray_for_pixel(&c, x, y).origin, Vector3::new(0.0, 0.0, 3.0));
    }
}

#[test]
fn ray_generation_is_repeatable() {
    let c = Camera::new(Vector3::new(1.0, 2.0, 3.0), Vector3::zero());
    let p = Projection::new(33, 17, 60.0);

    assert_eq!(p.ray_for_pixel(&c, 5, 11), p.ray_for_pixel(&c, 5, 11));
}

#[test]
fn oriented_camera_looks_at_target() {
    let c = Camera::looking_at(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(-4.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    );
    let p = Projection::new(11, 11, 60.0);
    let r = p.ray_for_pixel(&c, 5, 5);

    assert_eq!(r.direction, Vector3::new(-1.0, 0.0, 0.0));
}
