use crate::matrix::Matrix3D;

/// The spin of the rendered object.
///
/// `angle1` turns the object about the X axis and `angle2` about the Z axis.
/// Angles are never wrapped; the trigonometry that consumes them is periodic.
/// Each tick of the frame loop adds a speed to its angle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AnimationState {
    pub angle1: f64,
    pub angle2: f64,
    pub speed1: f64,
    pub speed2: f64,
}

impl AnimationState {
    /// Creates a state at rest orientation spinning with the given speeds.
    pub fn new(speed1: f64, speed2: f64) -> AnimationState {
        AnimationState { speed1, speed2, ..Default::default() }
    }

    /// Returns the state one tick later.
    ///
    /// ```
    /// # use ascii_donut::animation::AnimationState;
    /// let s = AnimationState::new(0.5, -0.25).advanced().advanced();
    /// assert_eq!((s.angle1, s.angle2), (1.0, -0.5));
    /// ```
    pub fn advanced(&self) -> AnimationState {
        AnimationState {
            angle1: self.angle1 + self.speed1,
            angle2: self.angle2 + self.speed2,
            ..*self
        }
    }

    /// Returns the same orientation with new speeds.
    pub fn with_speeds(&self, speed1: f64, speed2: f64) -> AnimationState {
        AnimationState { speed1, speed2, ..*self }
    }

    /// The rigid rotation for the current angles: about X by `angle1`, then
    /// about Z by `angle2`.
    pub fn rotation(&self) -> Matrix3D {
        Matrix3D::rotation_z(self.angle2) * Matrix3D::rotation_x(self.angle1)
    }
}

#[test]
fn advance_adds_speeds() {
    let s = AnimationState::new(0.04, 0.02).advanced();

    assert_eq!(s.angle1, 0.04);
    assert_eq!(s.angle2, 0.02);
    assert_eq!(s.speed1, 0.04);
    assert_eq!(s.speed2, 0.02);
}

#[test]
fn with_speeds_keeps_orientation() {
    let s = AnimationState::new(1.0, 2.0).advanced().with_speeds(0.0, 0.5);

    assert_eq!((s.angle1, s.angle2), (1.0, 2.0));
    assert_eq!((s.speed1, s.speed2), (0.0, 0.5));
}

#[test]
fn rest_orientation_is_identity() {
    assert_eq!(AnimationState::default().rotation(), Matrix3D::identity());
}

#[test]
fn rotation_is_proper() {
    let mut s = AnimationState::new(0.37, 1.1);
    for _ in 0..50 {
        s = s.advanced();
        assert!(s.rotation().is_rotation());
    }
}

#[test]
fn rotation_round_trip() {
    use crate::tuple::Point3;

    let p = Point3::new(0.3, -2.2, 1.7);
    let (a1, a2) = (0.9, -2.4);
    let s = AnimationState { angle1: a1, angle2: a2, ..Default::default() };

    // Undo with the opposite angles in reverse axis order.
    let undo = Matrix3D::rotation_x(-a1) * Matrix3D::rotation_z(-a2);
    let back = undo * (s.rotation() * p);

    assert!((back - p).length() < 1e-9);
}
