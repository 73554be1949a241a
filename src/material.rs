use serde::Deserialize;

use crate::vector::{ Color, Vector3 };

/// Surface properties shared by every shaded primitive.
///
/// `diffuse` and `specular` scale the Lambert and Phong terms; `reflectivity`
/// in `[0, 1]` scales the mirror contribution. The Phong exponent is fixed
/// (see `consts::SHININESS`) and not part of the material.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: Color,
    pub diffuse: f64,
    pub specular: f64,
    pub reflectivity: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Vector3::white(),
            diffuse: 1.0,
            specular: 0.0,
            reflectivity: 0.0,
        }
    }
}

impl Material {
    pub fn new(color: Color, diffuse: f64, specular: f64, reflectivity: f64)
        -> Material {
        Material { color, diffuse, specular, reflectivity }
    }

    /// A matte material: pure diffuse, no highlight, no reflection.
    pub fn matte(color: Color) -> Material {
        Material { color, ..Default::default() }
    }
}

#[test]
fn default_material_is_white_matte() {
    let m: Material = Default::default();

    assert_eq!(m.color, Vector3::white());
    assert_eq!(m.diffuse, 1.0);
    assert_eq!(m.specular, 0.0);
    assert_eq!(m.reflectivity, 0.0);
}

#[test]
fn material_from_partial_json() {
    let m: Material = serde_json::from_str(
        r#"{ "color": [1.0, 0.0, 0.0], "specular": 0.5 }"#
    ).unwrap();

    assert_eq!(m.color, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(m.diffuse, 1.0);
    assert_eq!(m.specular, 0.5);
}
