use std::thread;
use std::time::Instant;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use log::{ debug, info, warn };

use crate::ray::Ray;
use crate::scene::Scene;
use crate::canvas::Canvas;
use crate::camera::Projection;
use crate::tracer::raytrace;
use crate::error::RenderError;

/// One pixel's worth of work: where it goes and the camera ray to trace.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkItem {
    pub x: usize,
    pub y: usize,
    pub ray: Ray,
}

/// A traced pixel, carrying its own coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelResult {
    pub x: usize,
    pub y: usize,
    pub rgb: [u8; 3],
}

pub enum Message {
    Pixel(WorkItem),
    Terminate,
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, scene: Arc<Scene>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<PixelResult>) -> Result<Worker, RenderError> {

        let thread = thread::Builder::new()
            .name(format!("render-worker-{}", id))
            .spawn(move || {
                debug!("Worker {} started.", id);

                loop {
                    // Hold the lock only while dequeuing, never while tracing.
                    let message = {
                        let guard = match receiver.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        guard.recv()
                    };

                    match message {
                        Ok(Message::Pixel(item)) => {
                            let color = raytrace(&item.ray, &scene, 0);
                            let result = PixelResult {
                                x: item.x,
                                y: item.y,
                                rgb: color.to_color_bytes(),
                            };

                            if results.send(result).is_err() {
                                break;
                            }
                        },

                        Ok(Message::Terminate) | Err(_) => break,
                    }
                }

                debug!("Worker {} stopped.", id);
            })
            .map_err(RenderError::Spawn)?;

        Ok(Worker { id, thread: Some(thread) })
    }
}

/// A fixed pool of render workers sharing one read-only scene.
///
/// Work is fed through a bounded queue. Each worker sends its `PixelResult`s
/// back on the channel handed to `ThreadPool::new`.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::SyncSender<Message>,
    finished: bool,
}

impl ThreadPool {
    /// Starts `size` workers.
    ///
    /// `capacity` bounds the work queue; sizing it to cover every message that
    /// will be sent means `execute` never blocks.
    pub fn new(size: usize, capacity: usize, scene: Arc<Scene>,
        results: mpsc::Sender<PixelResult>) -> Result<ThreadPool, RenderError> {
        if size == 0 {
            return Err(RenderError::NoWorkers);
        }

        let (sender, receiver) = mpsc::sync_channel(capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::new(
                id,
                Arc::clone(&scene),
                Arc::clone(&receiver),
                results.clone(),
            )?);
        }

        Ok(ThreadPool { workers, sender, finished: false })
    }

    pub fn execute(&self, item: WorkItem) -> Result<(), RenderError> {
        self.sender.send(Message::Pixel(item))
            .map_err(|_| RenderError::QueueClosed)
    }

    /// Queues one `Terminate` per worker. Workers finish the pixels ahead of
    /// it first, since the queue is FIFO. Only the first call sends anything.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        for _ in &self.workers {
            if self.sender.send(Message::Terminate).is_err() {
                break;
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.finish();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!("Render worker {} panicked.", worker.id);
                }
            }
        }
    }
}

/// Checks the render parameters and returns the pixel count along with the
/// work queue capacity.
fn validate(projection: &Projection, threads: usize)
    -> Result<(usize, usize), RenderError> {
    if threads == 0 {
        return Err(RenderError::NoWorkers);
    }

    if projection.width == 0 || projection.height == 0 {
        return Err(RenderError::EmptyImage {
            width: projection.width,
            height: projection.height,
        });
    }

    let fov = projection.field_of_view;
    if !(fov > 0.0 && fov < 180.0) {
        return Err(RenderError::InvalidFieldOfView(fov));
    }

    let total = projection.width.checked_mul(projection.height);
    match total.and_then(|t| t.checked_add(threads).map(|c| (t, c))) {
        Some(sizes) => Ok(sizes),
        None => Err(RenderError::ImageTooLarge {
            width: projection.width,
            height: projection.height,
        }),
    }
}

/// Traces every pixel of `projection` on `threads` workers and hands each
/// result to `collect` on the calling thread, in completion order.
///
/// Returns once exactly `width * height` results have been collected. If
/// the workers all stop early the render fails with
/// `RenderError::MissingResults` instead of waiting forever.
pub fn render_with<F>(scene: Arc<Scene>, projection: &Projection,
    threads: usize, mut collect: F) -> Result<(), RenderError>
    where F: FnMut(PixelResult) {
    let (total, capacity) = validate(projection, threads)?;
    let (result_sender, result_receiver) = mpsc::channel();

    let mut pool = ThreadPool::new(threads, capacity,
        Arc::clone(&scene), result_sender)?;

    for y in 0..projection.height {
        for x in 0..projection.width {
            let ray = projection.ray_for_pixel(&scene.camera, x, y);
            pool.execute(WorkItem { x, y, ray })?;
        }
    }
    pool.finish();

    let mut received = 0;
    while received < total {
        match result_receiver.recv() {
            Ok(result) => {
                collect(result);
                received += 1;
            },

            // Every worker dropped its sender before the count was reached.
            Err(_) => break,
        }
    }

    drop(pool);

    if received < total {
        return Err(RenderError::MissingResults { expected: total, received });
    }

    Ok(())
}

/// Renders `scene` into a new canvas using `threads` workers.
pub fn parallel_render(scene: Scene, projection: &Projection, threads: usize)
    -> Result<Canvas, RenderError> {
    validate(projection, threads)?;
    let mut canvas = Canvas::new(projection.width, projection.height);

    info!("Rendering {}x{} using {} threads...",
        projection.width, projection.height, threads);
    let start = Instant::now();

    render_with(Arc::new(scene), projection, threads, |px| {
        canvas.write_pixel(px.x, px.y, px.rgb);
    })?;

    info!("...done in {:.2?}.", start.elapsed());
    Ok(canvas)
}

#[cfg(test)]
use crate::camera::Camera;
#[cfg(test)]
use crate::material::Material;
#[cfg(test)]
use crate::primitive::Primitive;
#[cfg(test)]
use crate::vector::Vector3;

#[cfg(test)]
fn red_sphere_scene() -> Scene {
    Scene::new(vec![
        Primitive::sphere(Vector3::new(0.0, 0.0, -1.0), 1.0,
            Material::matte(Vector3::new(1.0, 0.0, 0.0))),
        Primitive::light(Vector3::new(0.0, 0.5, 2.0), 0.1, Vector3::white()),
    ], Camera::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0)))
}

#[test]
fn red_sphere_end_to_end() {
    let projection = Projection::new(4, 4, 60.0);
    let canvas = parallel_render(red_sphere_scene(), &projection, 3).unwrap();

    // The four center pixels look straight at the sphere.
    for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
        let [r, g, b] = canvas.read_pixel(x, y).unwrap();
        assert!(r > 0, "pixel ({}, {}) should be red", x, y);
        assert_eq!((g, b), (0, 0));
    }

    // The corners see past it into the background.
    for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
        assert_eq!(canvas.read_pixel(x, y), Some([0, 0, 0]));
    }
}

#[test]
fn tiny_render_of_red_sphere_misses() {
    // At 2x2 and 60 degrees every pixel center falls outside the sphere's
    // silhouette, so the whole image is background.
    let projection = Projection::new(2, 2, 60.0);
    let canvas = parallel_render(red_sphere_scene(), &projection, 2).unwrap();

    assert_eq!(canvas, Canvas::new(2, 2));
}

#[test]
fn every_pixel_collected_exactly_once() {
    let scene = Arc::new(Scene::new(Vec::new(), Camera::default()));
    let projection = Projection::new(17, 9, 70.0);
    let mut counts = vec![0usize; 17 * 9];

    render_with(scene, &projection, 4, |px| {
        assert_eq!(px.rgb, [0, 0, 0]);
        counts[px.y * 17 + px.x] += 1;
    }).unwrap();

    assert!(counts.iter().all(|&n| n == 1));
}

#[test]
fn parallel_matches_sequential() {
    let scene = Scene::demo();
    let projection = Projection::new(24, 16, 70.0);

    let canvas = parallel_render(scene.clone(), &projection, 5).unwrap();

    for y in 0..projection.height {
        for x in 0..projection.width {
            let ray = projection.ray_for_pixel(&scene.camera, x, y);
            let expected = raytrace(&ray, &scene, 0).to_color_bytes();
            assert_eq!(canvas.read_pixel(x, y), Some(expected));
        }
    }
}

#[test]
fn zero_workers_is_an_error() {
    let projection = Projection::new(2, 2, 60.0);

    assert!(matches!(
        parallel_render(Scene::demo(), &projection, 0),
        Err(RenderError::NoWorkers)
    ));
}

#[test]
fn degenerate_projection_is_an_error() {
    assert!(matches!(
        parallel_render(Scene::demo(), &Projection::new(0, 4, 60.0), 1),
        Err(RenderError::EmptyImage { .. })
    ));
    assert!(matches!(
        parallel_render(Scene::demo(), &Projection::new(4, 4, 180.0), 1),
        Err(RenderError::InvalidFieldOfView(_))
    ));
}

#[test]
fn pool_rejects_zero_size() {
    let (tx, _rx) = mpsc::channel();
    let scene = Arc::new(Scene::demo());

    assert!(matches!(ThreadPool::new(0, 1, scene, tx),
        Err(RenderError::NoWorkers)));
}

#[test]
fn oversized_image_is_an_error() {
    let scene = Arc::new(Scene::new(Vec::new(), Camera::default()));

    // The pixel count itself overflows.
    let huge = Projection::new(usize::MAX, 2, 60.0);
    assert!(matches!(parallel_render(Scene::demo(), &huge, 1),
        Err(RenderError::ImageTooLarge { .. })));

    // The pixel count fits but the terminate messages do not.
    let wide = Projection::new(usize::MAX, 1, 60.0);
    assert!(matches!(render_with(scene, &wide, 2, |_| ()),
        Err(RenderError::ImageTooLarge { .. })));
}
