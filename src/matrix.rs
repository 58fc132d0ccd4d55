use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple3D;

/// A 3x3 matrix.
///
/// The renderer only ever rotates things about the origin, so a 3x3 linear
/// transform is all it needs; there is no translation component. Points and
/// normals are multiplied by the same matrix, which is sound because every
/// matrix built here is a rotation (orthonormal, determinant `+1`).
///
/// Elements are stored in row-major order and indexed with `(row, col)`.
///
/// # Examples
///
/// Rotations compose by multiplication, applied right-to-left:
///
/// ```
/// # use ascii_donut::tuple::Point3;
/// # use ascii_donut::matrix::Matrix3D;
/// use std::f64::consts::FRAC_PI_2;
///
/// let m = Matrix3D::rotation_z(FRAC_PI_2) * Matrix3D::rotation_x(FRAC_PI_2);
/// assert_eq!(m * Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0));
/// assert!(m.is_rotation());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix3D {
    data: [f64; 9],
}

/// Determines whether two `Matrix3D`s are equal.
///
/// Matrices are compared element-wise, with the same tolerance as tuples.
impl PartialEq for Matrix3D {
    fn eq(&self, other: &Matrix3D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix3D {
    /// Creates a new `Matrix3D`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix3D {
        Matrix3D { data: [0.0; 9] }
    }

    /// Instantiates a 3x3 identity matrix.
    pub fn identity() -> Matrix3D {
        let mut buf = [0.0; 9];
        buf[0] = 1.0; buf[4] = 1.0; buf[8] = 1.0;

        Matrix3D { data: buf }
    }

    /// Instantiates a rotation about the X axis by `r` radians.
    ///
    /// ```
    /// # use ascii_donut::tuple::Point3;
    /// # use ascii_donut::matrix::Matrix3D;
    /// let m = Matrix3D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix3D {
        let (sin, cos) = r.sin_cos();
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  cos;
        rotate[(1, 2)] = -sin;
        rotate[(2, 1)] =  sin;
        rotate[(2, 2)] =  cos;

        rotate
    }

    /// Instantiates a rotation about the Y axis by `r` radians.
    ///
    /// This is the axis the tube circle is swept around to form the ring.
    ///
    /// ```
    /// # use ascii_donut::tuple::Point3;
    /// # use ascii_donut::matrix::Matrix3D;
    /// let m = Matrix3D::rotation_y(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, -1.0));
    /// ```
    pub fn rotation_y(r: f64) -> Matrix3D {
        let (sin, cos) = r.sin_cos();
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  cos;
        rotate[(0, 2)] =  sin;
        rotate[(2, 0)] = -sin;
        rotate[(2, 2)] =  cos;

        rotate
    }

    /// Instantiates a rotation about the Z axis by `r` radians.
    ///
    /// ```
    /// # use ascii_donut::tuple::Point3;
    /// # use ascii_donut::matrix::Matrix3D;
    /// let m = Matrix3D::rotation_z(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * Point3::new(0.0, 1.0, 0.0), Point3::new(-1.0, 0.0, 0.0));
    /// ```
    pub fn rotation_z(r: f64) -> Matrix3D {
        let (sin, cos) = r.sin_cos();
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  cos;
        rotate[(0, 1)] = -sin;
        rotate[(1, 0)] =  sin;
        rotate[(1, 1)] =  cos;

        rotate
    }

    /// Produces the transpose of a matrix, returning a new matrix.
    ///
    /// For a rotation the transpose is also the inverse, which is what
    /// undoing an animation step relies on.
    pub fn transposition(&self) -> Matrix3D {
        let mut buf = self.clone();

        for r in 0..3 {
            for c in (r+1)..3 {
                let tmp = buf[(r, c)];
                buf[(r, c)] = buf[(c, r)];
                buf[(c, r)] = tmp;
            }
        }

        buf
    }

    /// Calculates the determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        let m = self;

        m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
            - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
            + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
    }

    /// Checks that the matrix is a proper rotation.
    ///
    /// A proper rotation is orthonormal (its transpose is its inverse) and
    /// has a determinant of `+1`, so it preserves lengths and handedness.
    pub fn is_rotation(&self) -> bool {
        *self * self.transposition() == Matrix3D::identity()
            && feq(self.determinant(), 1.0)
    }
}

impl From<[f64; 9]> for Matrix3D {
    fn from(data: [f64; 9]) -> Matrix3D {
        Matrix3D { data }
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f64;

    fn index<'a>(&'a self, index: (usize, usize)) -> &'a f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3D {
    fn index_mut<'a>(&'a mut self, index: (usize, usize)) -> &'a mut f64 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Not commutative: `A * B` applies `B` first, then `A`.
impl Mul<Matrix3D> for Matrix3D {
    type Output = Matrix3D;

    fn mul(self, other: Matrix3D) -> Matrix3D {
        let mut res = Matrix3D::new();

        for r in 0..3 {
            for c in 0..3 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
            }
        }

        res
    }
}

/// Multiplication between a matrix and a `Tuple3D`.
///
/// Tuples are treated as column vectors and multiplied on the right.
impl Mul<Tuple3D> for Matrix3D {
    type Output = Tuple3D;

    fn mul(self, other: Tuple3D) -> Tuple3D {
        let mut buf: [f64; 3] = Default::default();

        for r in 0..3 {
            buf[r] = self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z;
        }

        Tuple3D { x: buf[0], y: buf[1], z: buf[2] }
    }
}

#[test]
fn identity() {
    let i = Matrix3D::identity();
    let a: Matrix3D = [ 0.0, 1.0, 2.0,
                        1.0, 2.0, 4.0,
                        2.0, 4.0, 8.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn transpose() {
    let a: Matrix3D = [ 0.0, 9.0, 3.0,
                        9.0, 8.0, 0.0,
                        1.0, 8.0, 5.0, ].into();

    let t: Matrix3D = [ 0.0, 9.0, 1.0,
                        9.0, 8.0, 8.0,
                        3.0, 0.0, 5.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);
}

#[test]
fn determinant() {
    let a: Matrix3D = [  1.0, 2.0,  6.0,
                        -5.0, 8.0, -4.0,
                         2.0, 6.0,  4.0, ].into();

    assert_eq!(a.determinant(), -196.0);
    assert_eq!(Matrix3D::identity().determinant(), 1.0);
}

#[test]
fn rotations_are_proper() {
    for i in 0..16 {
        let r = i as f64 * 0.7;

        assert!(Matrix3D::rotation_x(r).is_rotation());
        assert!(Matrix3D::rotation_y(r).is_rotation());
        assert!(Matrix3D::rotation_z(r).is_rotation());
        assert!((Matrix3D::rotation_z(r) * Matrix3D::rotation_x(-r * 2.0))
            .is_rotation());
    }
}

#[test]
fn reflection_is_not_a_rotation() {
    let mirror: Matrix3D = [ -1.0, 0.0, 0.0,
                              0.0, 1.0, 0.0,
                              0.0, 0.0, 1.0, ].into();

    assert!(!mirror.is_rotation());
}

#[test]
fn scaling_is_not_a_rotation() {
    let scale: Matrix3D = [ 2.0, 0.0, 0.0,
                            0.0, 2.0, 0.0,
                            0.0, 0.0, 0.25, ].into();

    assert!(!scale.is_rotation());
}

#[test]
fn transpose_undoes_rotation() {
    let p = Tuple3D::new(1.0, -2.0, 3.0);
    let m = Matrix3D::rotation_z(0.4) * Matrix3D::rotation_x(1.3);

    assert_eq!(m.transposition() * (m * p), p);
}

#[test]
fn rotation_x_quarter() {
    let p = Tuple3D::new(0.0, 1.0, 0.0);
    let half_quarter = Matrix3D::rotation_x(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix3D::rotation_x(std::f64::consts::PI / 2.0);

    assert_eq!(half_quarter * p,
        Tuple3D::new(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
    assert_eq!(full_quarter * p, Tuple3D::new(0.0, 0.0, 1.0));
}
