use crate::geometry::Sample;
use crate::tuple::Vector3;

/// Calculates the Lambertian brightness of a surface point.
///
/// The result is `max(0, normal · light) / |normal|`. There is no ambient
/// term, so a surface facing away from the light is fully dark.
///
/// The light direction is used as given. Its length acts as an intensity: a
/// light twice as long makes everything twice as bright, and brightness past
/// `1.0` is only clamped later, when picking a glyph.
///
/// Normals coming out of the geometry stage are rotated unit vectors, but the
/// division by their length is kept so rounding drift never inflates the
/// result. A zero-length normal is treated as unlit.
///
/// # Examples
///
/// ```
/// # use ascii_donut::tuple::Vector3;
/// # use ascii_donut::light::luminosity;
/// let up = Vector3::new(0.0, 1.0, 0.0);
///
/// assert_eq!(luminosity(&up, &Vector3::new(0.0, 1.0, 0.0)), 1.0);
/// assert_eq!(luminosity(&up, &Vector3::new(0.0, -1.0, 0.0)), 0.0);
/// assert_eq!(luminosity(&up, &Vector3::new(0.0, 3.0, 0.0)), 3.0);
/// ```
pub fn luminosity(normal: &Vector3, light: &Vector3) -> f64 {
    let length = normal.length();
    if !(length > 0.0) {
        return 0.0;
    }

    normal.dot(light).max(0.0) / length
}

/// Shades every sample in place against a single directional light.
pub fn shade(samples: &mut [Sample], light: &Vector3) {
    for sample in samples.iter_mut() {
        sample.luminosity = luminosity(&sample.normal, light);
    }
}

#[test]
fn light_facing_surface() {
    let n = Vector3::new(0.0, 0.0, -1.0);
    let l = Vector3::new(0.0, 0.0, -1.0);

    assert_eq!(luminosity(&n, &l), 1.0);
}

#[test]
fn light_at_45_degrees() {
    let n = Vector3::new(0.0, 0.0, -1.0);
    let l = Vector3::new(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0));

    assert!((luminosity(&n, &l) - 2.0f64.sqrt() / 2.0).abs() < 1e-12);
}

#[test]
fn light_behind_surface() {
    let n = Vector3::new(0.0, 0.0, -1.0);
    let l = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(luminosity(&n, &l), 0.0);
}

#[test]
fn light_grazing_surface() {
    let n = Vector3::new(1.0, 0.0, 0.0);
    let l = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(luminosity(&n, &l), 0.0);
}

#[test]
fn light_magnitude_scales_brightness() {
    let n = Vector3::new(0.6, 0.8, 0.0);
    let l = Vector3::new(0.6, 0.8, 0.0);

    assert!((luminosity(&n, &l) - 1.0).abs() < 1e-12);
    assert!((luminosity(&n, &(l * 2.5)) - 2.5).abs() < 1e-12);
}

#[test]
fn unnormalized_normal_is_divided_out() {
    let n = Vector3::new(0.0, 2.0, 0.0);
    let l = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(luminosity(&n, &l), 1.0);
}

#[test]
fn degenerate_normal_is_dark() {
    let l = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(luminosity(&Vector3::new(0.0, 0.0, 0.0), &l), 0.0);
}

#[test]
fn shaded_torus_is_never_negative() {
    use crate::animation::AnimationState;
    use crate::geometry::{ Renderable, TorusShape };

    let t = TorusShape::new(1.0, 2.0, 0.1, 0.05).expect("valid torus");
    let state = AnimationState { angle1: 0.7, angle2: 2.1,
        ..Default::default() };
    let mut samples = t.samples(&state);
    shade(&mut samples, &Vector3::new(0.0, 1.0, -1.0));

    assert!(samples.iter().all(|s| s.luminosity >= 0.0));
    assert!(samples.iter().any(|s| s.luminosity > 0.0));
    assert!(samples.iter().any(|s| s.luminosity == 0.0));
}
