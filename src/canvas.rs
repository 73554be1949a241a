use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use image::{ ImageBuffer, Rgb };

use crate::error::OutputError;

/// A finished image: one 8-bit RGB sample per pixel.
///
/// Pixels are addressed as `(x, y)` with `(0, 0)` in the top-left corner,
/// matching how `Projection::ray_for_pixel` lays out camera rays.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// Row-major pixel storage.
    pixels: Vec<[u8; 3]>,
}

impl Canvas {
    /// Creates a black canvas of `width * height` pixels.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height],
        }
    }

    /// Writes a pixel. Out-of-bounds coordinates are ignored.
    ///
    /// ```
    /// # use whitted_tracer::canvas::Canvas;
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, [255, 0, 255]);
    /// assert_eq!(canvas.read_pixel(4, 2), Some([255, 0, 255]));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = rgb;
    }

    /// Reads a pixel, or `None` if `(x, y)` is out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Saves the canvas, choosing the encoder from the file extension.
    ///
    /// `.png` goes through the `image` crate; `.ppm` is written as plain-text
    /// P3.
    pub fn save(&self, path: &Path) -> Result<(), OutputError> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => self.save_png(path),
            "ppm" => self.save_ppm(path),
            _ => Err(OutputError::UnsupportedFormat(ext)),
        }
    }

    fn save_png(&self, path: &Path) -> Result<(), OutputError> {
        let image = ImageBuffer::from_fn(
            self.width as u32, self.height as u32, |x, y| {
                Rgb(self.pixels[(y as usize * self.width) + x as usize])
            });

        image.save(path)?;
        Ok(())
    }

    /// Writes a P3 PPM. No line exceeds 70 columns; a sample that would
    /// cross the limit starts a new line.
    fn save_ppm(&self, path: &Path) -> Result<(), OutputError> {
        let mut out = BufWriter::new(File::create(path)?);

        writeln!(&mut out, "P3")?;
        writeln!(&mut out, "{} {}", self.width, self.height)?;
        writeln!(&mut out, "255")?;

        let mut col = 0;
        for sample in self.pixels.iter().flat_map(|p| p.iter()) {
            let s = sample.to_string();

            if col != 0 && col + 1 + s.len() > 70 {
                writeln!(&mut out)?;
                col = 0;
            }

            if col != 0 {
                write!(&mut out, " ")?;
                col += 1;
            }

            write!(&mut out, "{}", s)?;
            col += s.len();
        }

        writeln!(&mut out)?;
        out.flush()?;

        Ok(())
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.read_pixel(0, 0), Some([0, 0, 0]));
    assert_eq!(c.read_pixel(9, 19), Some([0, 0, 0]));
    assert_eq!(c.read_pixel(10, 0), None);
}

#[test]
fn out_of_bounds_write_is_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, [1, 2, 3]);

    assert_eq!(c, Canvas::new(2, 2));
}

#[test]
fn ppm_lines_stay_short() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, [255, 204, 153]);
        }
    }

    let path = std::env::temp_dir()
        .join(format!("whitted_ppm_lines_{}.ppm", std::process::id()));
    c.save(&path).unwrap();
    let ppm = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let lines: Vec<&str> = ppm.lines().collect();
    assert_eq!(&lines[..3], &["P3", "10 2", "255"]);
    assert!(lines.iter().all(|l| l.len() <= 70));
    assert_eq!(lines[3], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert!(ppm.ends_with('\n'));

    let samples: usize = lines[3..].iter()
        .map(|l| l.split_whitespace().count())
        .sum();
    assert_eq!(samples, 10 * 2 * 3);
}

#[test]
fn png_round_trips_pixels() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(2, 1, [10, 20, 30]);

    let path = std::env::temp_dir()
        .join(format!("whitted_round_trip_{}.png", std::process::id()));
    c.save(&path).unwrap();
    let img = image::open(&path).unwrap().to_rgb8();
    std::fs::remove_file(&path).ok();

    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn unknown_extension_is_rejected() {
    let c = Canvas::new(1, 1);
    let path = std::env::temp_dir().join("whitted_image.bmp");

    assert!(matches!(c.save(&path), Err(OutputError::UnsupportedFormat(_))));
}
