use std::f64::consts::TAU;

use crate::animation::AnimationState;
use crate::consts::{ MAX_SAMPLES_PER_FRAME, MAX_STEPS_PER_REVOLUTION };
use crate::matrix::Matrix3D;
use crate::scene::ConfigError;
use crate::tuple::{ Point3, Vector3 };

/// Slack used when counting steps, so a step that divides a full turn exactly
/// does not pick up a duplicate sample at the wrap point.
const STEP_COUNT_EPSILON: f64 = 1e-9;

/// A point on a rendered surface.
///
/// Samples are regenerated every frame and carry no identity between frames.
/// `luminosity` is zero until the sample has been through the shader.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sample {
    /// The view-space position.
    pub position: Point3,

    /// The outward unit normal at `position`, rotated along with it.
    pub normal: Vector3,

    /// Non-negative brightness, unbounded above.
    pub luminosity: f64,
}

impl Sample {
    pub fn new(position: Point3, normal: Vector3) -> Sample {
        Sample { position, normal, luminosity: 0.0 }
    }
}

/// Something the frame loop can spin and draw.
///
/// An implementor produces its surface samples for a given animation state,
/// and decides how that state moves forward by one tick.
pub trait Renderable {
    fn samples(&self, state: &AnimationState) -> Vec<Sample>;
    fn advance(&self, state: AnimationState) -> AnimationState;
}

/// Number of samples taken along one full revolution at `step` radians.
///
/// Equivalent to counting `angle = 0, step, 2 * step, ...` while
/// `angle < 2π`, without accumulating floating point error along the way.
///
/// ```
/// # use ascii_donut::geometry::steps_per_revolution;
/// use std::f64::consts::PI;
///
/// assert_eq!(steps_per_revolution(PI), 2);
/// assert_eq!(steps_per_revolution(0.07), 90);
/// assert_eq!(steps_per_revolution(2.0 * PI / 3.0), 3);
/// ```
pub fn steps_per_revolution(step: f64) -> usize {
    (TAU / step - STEP_COUNT_EPSILON).ceil().max(1.0) as usize
}

/// The shape of a torus and how finely it is sampled.
///
/// A circle of radius `tube_radius` (the tube) is swept around a ring of
/// radius `ring_radius`. The tube is walked in `theta_step` increments and the
/// ring in `phi_step` increments; smaller steps give denser, slower frames.
///
/// Fields are private so that a `TorusShape` is always valid: use
/// `TorusShape::new`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TorusShape {
    tube_radius: f64,
    ring_radius: f64,
    theta_step: f64,
    phi_step: f64,
}

impl TorusShape {
    /// Creates a torus, rejecting radii and steps that cannot be rendered.
    ///
    /// Radii must be positive and finite. Steps must be positive, finite and
    /// coarse enough that one revolution needs at most
    /// `MAX_STEPS_PER_REVOLUTION` samples, and a whole frame at most
    /// `MAX_SAMPLES_PER_FRAME`.
    pub fn new(tube_radius: f64, ring_radius: f64, theta_step: f64,
        phi_step: f64) -> Result<TorusShape, ConfigError> {
        check_radius("tube_radius", tube_radius)?;
        check_radius("ring_radius", ring_radius)?;
        check_step("theta_step", theta_step)?;
        check_step("phi_step", phi_step)?;

        let thetas = steps_per_revolution(theta_step);
        let phis = steps_per_revolution(phi_step);
        match thetas.checked_mul(phis) {
            Some(n) if n <= MAX_SAMPLES_PER_FRAME => {},
            _ => return Err(ConfigError::Invalid(format!(
                "theta_step {} and phi_step {} need {}x{} samples per frame \
                 (at most {} allowed)",
                theta_step, phi_step, thetas, phis, MAX_SAMPLES_PER_FRAME
            ))),
        }

        Ok(TorusShape { tube_radius, ring_radius, theta_step, phi_step })
    }

    pub fn tube_radius(&self) -> f64 {
        self.tube_radius
    }

    pub fn ring_radius(&self) -> f64 {
        self.ring_radius
    }

    pub fn theta_step(&self) -> f64 {
        self.theta_step
    }

    pub fn phi_step(&self) -> f64 {
        self.phi_step
    }

    /// The number of samples `samples` produces per frame.
    pub fn sample_count(&self) -> usize {
        steps_per_revolution(self.theta_step)
            * steps_per_revolution(self.phi_step)
    }
}

fn check_radius(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid(
            format!("{} must be a positive number, got {}", name, value)
        ));
    }

    Ok(())
}

fn check_step(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid(
            format!("{} must be a positive number, got {}", name, value)
        ));
    }

    let steps = steps_per_revolution(value);
    if steps > MAX_STEPS_PER_REVOLUTION {
        return Err(ConfigError::Invalid(format!(
            "{} of {} needs {} samples per revolution (at most {} allowed)",
            name, value, steps, MAX_STEPS_PER_REVOLUTION
        )));
    }

    Ok(())
}

impl Renderable for TorusShape {
    /// Samples the torus surface at the given orientation.
    ///
    /// For each `theta` the tube circle point `(0, r1 sin θ, r2 + r1 cos θ)`
    /// and its radial normal `(0, sin θ, cos θ)` are built in the Y-Z plane.
    /// Each `phi` sweeps them about the Y axis, and the animation rotation is
    /// applied on top. Point and normal always go through the same matrix.
    fn samples(&self, state: &AnimationState) -> Vec<Sample> {
        let thetas = steps_per_revolution(self.theta_step);
        let phis = steps_per_revolution(self.phi_step);
        let spin = state.rotation();

        // The sweep matrices are the same for every theta.
        let sweeps: Vec<Matrix3D> = (0..phis)
            .map(|j| spin * Matrix3D::rotation_y(j as f64 * self.phi_step))
            .collect();

        let mut samples = Vec::with_capacity(thetas * phis);
        for i in 0..thetas {
            let (sin_theta, cos_theta) = (i as f64 * self.theta_step).sin_cos();

            let circle = Point3::new(
                0.0,
                self.tube_radius * sin_theta,
                self.ring_radius + self.tube_radius * cos_theta,
            );
            let radial = Vector3::new(0.0, sin_theta, cos_theta);

            for sweep in sweeps.iter() {
                samples.push(Sample::new(*sweep * circle, *sweep * radial));
            }
        }

        samples
    }

    fn advance(&self, state: AnimationState) -> AnimationState {
        state.advanced()
    }
}

#[cfg(test)]
fn torus(theta_step: f64, phi_step: f64) -> TorusShape {
    TorusShape::new(1.0, 2.0, theta_step, phi_step)
        .expect("Test torus should be valid.")
}

#[test]
fn step_counts() {
    use std::f64::consts::PI;

    assert_eq!(steps_per_revolution(PI), 2);
    assert_eq!(steps_per_revolution(PI / 2.0), 4);
    assert_eq!(steps_per_revolution(2.0 * PI / 3.0), 3);
    assert_eq!(steps_per_revolution(TAU / 7.0), 7);
    assert_eq!(steps_per_revolution(0.07), 90);
    assert_eq!(steps_per_revolution(0.02), 315);
    assert_eq!(steps_per_revolution(1.0), 7);
}

#[test]
fn step_larger_than_revolution() {
    assert_eq!(steps_per_revolution(10.0), 1);
    assert_eq!(steps_per_revolution(TAU), 1);
    assert_eq!(torus(10.0, 10.0).samples(&Default::default()).len(), 1);
}

#[test]
fn sample_count_matches_steps() {
    use std::f64::consts::PI;

    let cases = [
        (PI, PI, 4),
        (PI / 2.0, PI, 8),
        (2.0 * PI / 3.0, PI / 2.0, 12),
        (0.07, 0.02, 90 * 315),
        (0.3, 0.1, 21 * 63),
    ];

    for &(theta_step, phi_step, expected) in cases.iter() {
        let t = torus(theta_step, phi_step);
        let state = AnimationState { angle1: 0.3, angle2: 1.2,
            ..Default::default() };

        assert_eq!(t.sample_count(), expected);
        assert_eq!(t.samples(&state).len(), expected);
    }
}

#[test]
fn normals_are_unit_length() {
    let t = torus(0.07, 0.02);
    let mut state = AnimationState::new(0.61, 1.37);

    for _ in 0..5 {
        state = t.advance(state);
        for s in t.samples(&state) {
            assert!((s.normal.length() - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn points_lie_on_torus() {
    let t = TorusShape::new(0.5, 3.0, 0.2, 0.2).expect("valid torus");
    let state = AnimationState { angle1: 0.8, angle2: -0.4,
        ..Default::default() };

    // Undo the animation; the point must then be r1 away from the ring
    // circle of radius r2 in the X-Z plane.
    let undo = state.rotation().transposition();
    for s in t.samples(&state) {
        let p = undo * s.position;
        let ring = (p.x.powi(2) + p.z.powi(2)).sqrt() - 3.0;
        let tube = (ring.powi(2) + p.y.powi(2)).sqrt();

        assert!((tube - 0.5).abs() < 1e-9);
    }
}

#[test]
fn normals_point_away_from_tube_center() {
    let t = torus(0.3, 0.3);
    let state = AnimationState { angle1: 1.1, angle2: 0.2,
        ..Default::default() };

    // Stepping a small distance along the normal moves further from the
    // tube's core, so the distance to the core must grow by that amount.
    let undo = state.rotation().transposition();
    for s in t.samples(&state) {
        let outward = undo * (s.position - s.normal * -0.1);
        let ring = (outward.x.powi(2) + outward.z.powi(2)).sqrt() - 2.0;
        let tube = (ring.powi(2) + outward.y.powi(2)).sqrt();

        assert!((tube - 1.1).abs() < 1e-9);
    }
}

#[test]
fn rest_samples_for_coarse_torus() {
    use crate::tuple::Tuple3D;

    let t = torus(std::f64::consts::PI, std::f64::consts::PI);
    let samples = t.samples(&AnimationState::default());

    // Loop order is theta outer, phi inner.
    let expected = [
        (Tuple3D::new( 0.0, 0.0,  3.0), Tuple3D::new(0.0, 0.0,  1.0)),
        (Tuple3D::new( 0.0, 0.0, -3.0), Tuple3D::new(0.0, 0.0, -1.0)),
        (Tuple3D::new( 0.0, 0.0,  1.0), Tuple3D::new(0.0, 0.0, -1.0)),
        (Tuple3D::new( 0.0, 0.0, -1.0), Tuple3D::new(0.0, 0.0,  1.0)),
    ];

    assert_eq!(samples.len(), 4);
    for (s, (position, normal)) in samples.iter().zip(expected.iter()) {
        assert_eq!(s.position, *position);
        assert_eq!(s.normal, *normal);
        assert_eq!(s.luminosity, 0.0);
    }
}

#[test]
fn samples_are_regenerable() {
    let t = torus(0.3, 0.2);
    let state = AnimationState { angle1: 2.0, angle2: 0.5,
        ..Default::default() };

    assert_eq!(t.samples(&state), t.samples(&state));
}

#[test]
fn reject_bad_shapes() {
    assert!(TorusShape::new(0.0, 2.0, 0.1, 0.1).is_err());
    assert!(TorusShape::new(1.0, -2.0, 0.1, 0.1).is_err());
    assert!(TorusShape::new(f64::NAN, 2.0, 0.1, 0.1).is_err());
    assert!(TorusShape::new(1.0, 2.0, 0.0, 0.1).is_err());
    assert!(TorusShape::new(1.0, 2.0, 0.1, -0.1).is_err());
    assert!(TorusShape::new(1.0, 2.0, f64::INFINITY, 0.1).is_err());
    assert!(TorusShape::new(1.0, 2.0, 0.1, 1e-9).is_err());
    assert!(TorusShape::new(1.0, 2.0, 1e-4, 1e-4).is_err());
    assert!(TorusShape::new(1.0, 2.0, 1e-3, 1e-3).is_err());
}

#[test]
fn frame_sample_cap() {
    // Each axis is fine on its own; only the product is too large.
    assert!(steps_per_revolution(1e-4) <= MAX_STEPS_PER_REVOLUTION);
    match TorusShape::new(1.0, 2.0, 1e-4, 1e-4) {
        Err(ConfigError::Invalid(msg)) => assert!(msg.contains("per frame")),
        other => panic!("Expected too many samples, got {:?}", other),
    }

    let fine = TorusShape::new(1.0, 2.0, 1e-3, 0.07).expect("within the cap");
    assert_eq!(fine.sample_count(), 6284 * 90);
    assert!(fine.sample_count() <= MAX_SAMPLES_PER_FRAME);
}

#[test]
fn reject_message_names_field() {
    match TorusShape::new(1.0, 2.0, 0.1, 0.0) {
        Err(ConfigError::Invalid(msg)) => assert!(msg.contains("phi_step")),
        other => panic!("Expected invalid phi_step, got {:?}", other),
    }
}
