pub mod consts;
pub mod error;

pub mod vector;
pub mod matrix;
pub mod ray;

pub mod material;
pub mod primitive;
pub mod intersect;
pub mod scene;
pub mod camera;

pub mod tracer;
pub mod parallel;
pub mod canvas;

pub mod cli;
pub mod logger;

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
