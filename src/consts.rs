// Runtime defaults
pub const DEFAULT_WIDTH: usize = 512;
pub const DEFAULT_HEIGHT: usize = 512;
pub const DEFAULT_FOV_DEGREES: f64 = 70.0;
pub const DEFAULT_OUT_FILE: &str = "output.png";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied to secondary ray origins to avoid self-intersection
pub const EPSILON: f64 = 0.0001;

// Maximum reflection recursion depth
pub const MAX_TRACE_DEPTH: usize = 8;

// Phong exponent used for every specular highlight
pub const SHININESS: f64 = 20.0;
