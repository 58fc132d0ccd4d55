use std::ops::{ Sub, Mul };

use crate::feq;

/// A triple of coordinates in 3D space.
///
/// Positions and directions share this one representation. The aliases
/// `Point3` and `Vector3` only document intent; nothing stops a point being
/// used as a vector, which is exactly what rotating a normal does.
///
/// Equality is approximate (see `feq`), since every tuple in the renderer is
/// the result of some floating point trigonometry.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple3D {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

/// A position in 3D space.
pub type Point3 = Tuple3D;

/// A direction or displacement in 3D space.
pub type Vector3 = Tuple3D;

impl PartialEq for Tuple3D {
    fn eq(&self, other: &Tuple3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

/// Conversion from a coordinate array, in `x`, `y`, `z` order.
///
/// Scene files describe vectors as plain JSON arrays; this is how they become
/// tuples.
impl From<[f64; 3]> for Tuple3D {
    fn from(v: [f64; 3]) -> Tuple3D {
        Tuple3D { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<Tuple3D> for [f64; 3] {
    fn from(t: Tuple3D) -> [f64; 3] {
        [t.x, t.y, t.z]
    }
}

impl Tuple3D {
    pub fn new(x: f64, y: f64, z: f64) -> Tuple3D {
        Tuple3D { x, y, z }
    }

    /// The Euclidean norm of the tuple.
    ///
    /// ```
    /// # use ascii_donut::tuple::Vector3;
    /// let v = Vector3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.length(), 5.0);
    /// ```
    pub fn length(&self) -> f64 {
        f64::sqrt(
            self.x.powi(2)
            + self.y.powi(2)
            + self.z.powi(2)
        )
    }

    pub fn dot(&self, other: &Tuple3D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Sub for Tuple3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z
        }
    }
}

/// Scalar right-multiplication.
///
/// Scaling the light direction is how brightness is turned up or down:
///
/// ```
/// use ascii_donut::tuple::Vector3;
///
/// let light = Vector3::new(0.0, 0.0, 1.0);
/// assert_eq!((light * 2.0).length(), 2.0);
/// ```
impl Mul<f64> for Tuple3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other
        }
    }
}

/* Tests */

#[test]
fn length_of_axis_vectors() {
    assert_eq!(Vector3::new(1.0, 0.0, 0.0).length(), 1.0);
    assert_eq!(Vector3::new(0.0, -1.0, 0.0).length(), 1.0);
    assert_eq!(Vector3::new(0.0, 0.0, 2.5).length(), 2.5);
}

#[test]
fn length_of_mixed_vector() {
    let v = Vector3::new(-1.0, 2.0, -3.0);

    assert_eq!(v.length(), f64::sqrt(14.0));
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn dot_perpendicular_vectors() {
    let a = Vector3::new(0.0, 1.0, 0.0);
    let b = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(a.dot(&b), 0.0);
}

#[test]
fn sub_points() {
    let p1 = Point3::new(3.0, 2.0, 1.0);
    let p2 = Point3::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn mul_scalar() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 0.5, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn array_round_trip() {
    let t: Tuple3D = [1.0, 2.0, 3.0].into();
    let a: [f64; 3] = t.into();

    assert_eq!(t, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(a, [1.0, 2.0, 3.0]);
}

#[test]
fn non_finite_components() {
    assert!(Vector3::new(1.0, 2.0, 3.0).is_finite());
    assert!(!Vector3::new(f64::NAN, 0.0, 0.0).is_finite());
    assert!(!Vector3::new(0.0, f64::INFINITY, 0.0).is_finite());
}
