// Torus shape
pub const TUBE_RADIUS: f64 = 1.0;
pub const RING_RADIUS: f64 = 2.0;
pub const THETA_STEP: f64 = 0.07;
pub const PHI_STEP: f64 = 0.02;

// Upper bound on samples along one loop of the torus. Smaller steps are
// rejected at configuration time rather than stalling the frame loop.
pub const MAX_STEPS_PER_REVOLUTION: usize = 1 << 16;

// Upper bound on samples generated for one frame, both loops together
pub const MAX_SAMPLES_PER_FRAME: usize = 1 << 20;

// Animation speeds, in radians per frame
pub const SPEED1: f64 = 0.04;
pub const SPEED2: f64 = 0.02;

// Screen and projection
pub const SCREEN_WIDTH: usize = 80;
pub const SCREEN_HEIGHT: usize = 24;
pub const PERSPECTIVE_SCALE: f64 = 30.0;
pub const VIEWER_DISTANCE: f64 = 5.0;

// Glyphs from dimmest to brightest
pub const GLYPH_RAMP: &'static str = ".,-~:;=!*#$@";

// Light direction; not normalized, so its magnitude scales brightness
pub const LIGHT_DIRECTION: [f64; 3] = [0.0, -0.70710678, -0.70710678];

// Frame cadence
pub const FRAME_INTERVAL_MS: u64 = 50;

// Frames a notice stays beneath the picture before it is wiped
pub const NOTICE_FRAMES: u32 = 60;
