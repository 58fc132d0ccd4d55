use serde::{ Serialize, Deserialize };

use crate::geometry::Sample;
use crate::glyph::GlyphRamp;
use crate::scene::ConfigError;
use crate::tuple::Point3;

/// What to do with samples that the light does not reach.
///
/// A sample with zero luminosity faces away from the light. Discarding it
/// means it never takes part in the depth test. Retaining it lets it win the
/// depth test like any other sample, so a dark surface nearer to the viewer
/// blanks out a lit one behind it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackFaces {
    Discard,
    Retain,
}

impl Default for BackFaces {
    fn default() -> BackFaces {
        BackFaces::Discard
    }
}

/// How a projected Y coordinate becomes a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalScale {
    /// `floor(y * ooz / 2)`: only the character cell aspect is corrected.
    Aspect,

    /// `floor(y * ooz * k1 / 2)`: rows are also scaled by the perspective
    /// factor, like columns are.
    Perspective,
}

impl Default for VerticalScale {
    fn default() -> VerticalScale {
        VerticalScale::Aspect
    }
}

/// Fixed properties of the screen, validated once at start-up.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    /// Width of the screen, in character cells.
    pub width: usize,

    /// Height of the screen, in character cells.
    pub height: usize,

    pub glyphs: GlyphRamp,
    pub back_faces: BackFaces,
    pub vertical_scale: VerticalScale,
}

impl ScreenConfig {
    pub fn new(width: usize, height: usize, glyphs: GlyphRamp,
        back_faces: BackFaces) -> Result<ScreenConfig, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid(format!(
                "screen must be at least 1x1, got {}x{}", width, height
            )));
        }

        Ok(ScreenConfig {
            width,
            height,
            glyphs,
            back_faces,
            vertical_scale: VerticalScale::default(),
        })
    }

    pub fn with_vertical_scale(self, vertical_scale: VerticalScale)
        -> ScreenConfig {
        ScreenConfig { vertical_scale, ..self }
    }
}

/// Per-cell depth and luminosity for one frame.
///
/// Depth is stored as inverse distance ("ooz"), so larger values are nearer
/// and `0.0` means nothing has been drawn. Both grids are stored as flattened
/// row-major vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,

    depth: Vec<f64>,
    luminosity: Vec<f64>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            depth: vec![0.0; width * height],
            luminosity: vec![0.0; width * height],
        }
    }

    /// Resets every cell to "nothing drawn".
    pub fn clear(&mut self) {
        self.depth.iter_mut().for_each(|d| *d = 0.0);
        self.luminosity.iter_mut().for_each(|l| *l = 0.0);
    }

    /// Offers a sample to a cell.
    ///
    /// The sample is kept only if it is strictly nearer than what the cell
    /// already holds, so of several samples at the same depth the first one
    /// stays. Out-of-bounds cells are ignored.
    pub fn plot(&mut self, x: usize, y: usize, ooz: f64, luminosity: f64) {
        if x >= self.width || y >= self.height {
            return;
        }

        let i = (y * self.width) + x;
        if ooz > self.depth[i] {
            self.depth[i] = ooz;
            self.luminosity[i] = luminosity;
        }
    }

    /// Reads the depth of a cell, or `None` if it is out-of-bounds.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.depth[(y * self.width) + x])
    }

    /// Reads the luminosity of a cell, or `None` if it is out-of-bounds.
    pub fn luminosity_at(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.luminosity[(y * self.width) + x])
    }

    /// Counts cells holding a lit sample.
    pub fn lit_cells(&self) -> usize {
        self.luminosity.iter().filter(|l| **l > 0.0).count()
    }
}

/// Projects shaded samples onto a character grid.
///
/// A frame goes `clear`, `project`, `draw`. Projection is a perspective
/// divide by `z + k2`. Columns are scaled by `k1`; rows are halved because
/// terminal cells are about twice as tall as they are wide, and only scaled
/// by `k1` too under `VerticalScale::Perspective`. The viewer sits on the
/// negative Z side looking towards +Z.
///
/// # Examples
///
/// ```
/// # use ascii_donut::geometry::Sample;
/// # use ascii_donut::glyph::GlyphRamp;
/// # use ascii_donut::screen::{ BackFaces, Screen, ScreenConfig };
/// # use ascii_donut::tuple::{ Point3, Vector3 };
/// let config = ScreenConfig::new(3, 1, GlyphRamp::new("#").unwrap(),
///     BackFaces::Discard).unwrap();
/// let mut screen = Screen::new(config);
///
/// let mut sample = Sample::new(Point3::new(0.0, 0.0, 0.0),
///     Vector3::new(0.0, 0.0, -1.0));
/// sample.luminosity = 0.5;
///
/// screen.clear();
/// screen.project(&[sample], 1.0, 1.0);
/// assert_eq!(screen.draw(), " # \n");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    config: ScreenConfig,
    buffer: FrameBuffer,
}

impl Screen {
    pub fn new(config: ScreenConfig) -> Screen {
        let buffer = FrameBuffer::new(config.width, config.height);

        Screen { config, buffer }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Finds the cell a point lands in, with its inverse depth.
    ///
    /// Returns `None` when the point projects off-screen or cannot be
    /// projected at all (it lies on the camera plane `z == -k2`).
    pub fn cell_for(&self, p: Point3, k1: f64, k2: f64)
        -> Option<(usize, usize, f64)> {
        let ooz = 1.0 / (p.z + k2);
        if !ooz.is_finite() {
            return None;
        }

        let y = match self.config.vertical_scale {
            VerticalScale::Aspect => p.y * ooz / 2.0,
            VerticalScale::Perspective => p.y * ooz * k1 / 2.0,
        };

        let sx = (p.x * ooz * k1).floor() + (self.config.width / 2) as f64;
        let sy = y.floor() + (self.config.height / 2) as f64;

        // Written to also reject NaN coordinates.
        let on_screen = sx >= 0.0 && sx < self.config.width as f64
            && sy >= 0.0 && sy < self.config.height as f64;
        if !on_screen {
            return None;
        }

        Some((sx as usize, sy as usize, ooz))
    }

    /// Depth-tests samples into the frame buffer, in order.
    pub fn project(&mut self, samples: &[Sample], k1: f64, k2: f64) {
        let retain = self.config.back_faces == BackFaces::Retain;

        for sample in samples.iter() {
            if !(sample.luminosity > 0.0 || retain) {
                continue;
            }

            if let Some((x, y, ooz)) = self.cell_for(sample.position, k1, k2) {
                self.buffer.plot(x, y, ooz, sample.luminosity);
            }
        }
    }

    /// Renders the frame buffer as text.
    ///
    /// Rows are emitted top to bottom, each `width` glyphs long and ended by
    /// a newline.
    pub fn draw(&self) -> String {
        let width = self.config.width;
        let height = self.config.height;
        let mut out = String::with_capacity((width + 1) * height);

        for y in 0..height {
            for x in 0..width {
                let l = self.buffer.luminosity_at(x, y).unwrap_or(0.0);
                out.push(self.config.glyphs.glyph_for(l));
            }

            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
fn screen(width: usize, height: usize, back_faces: BackFaces) -> Screen {
    let config = ScreenConfig::new(width, height, GlyphRamp::default(),
        back_faces).expect("Test screen should be valid.");

    Screen::new(config)
}

/// A lit sample that lands at the center cell with the given inverse depth
/// when projected with `k2 == 0`.
#[cfg(test)]
fn centered(ooz: f64, luminosity: f64) -> Sample {
    use crate::tuple::Vector3;

    let mut s = Sample::new(Point3::new(0.0, 0.0, 1.0 / ooz),
        Vector3::new(0.0, 0.0, -1.0));
    s.luminosity = luminosity;
    s
}

#[test]
fn new_buffer_is_empty() {
    let s = screen(10, 4, BackFaces::Discard);

    assert_eq!(s.buffer().lit_cells(), 0);
    assert_eq!(s.buffer().depth_at(9, 3), Some(0.0));
    assert_eq!(s.buffer().depth_at(10, 3), None);
    assert_eq!(s.draw(), "          \n".repeat(4));
}

#[test]
fn project_center() {
    let mut s = screen(10, 10, BackFaces::Discard);
    s.project(&[centered(0.25, 0.5)], 10.0, 0.0);

    assert_eq!(s.buffer().depth_at(5, 5), Some(0.25));
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.5));
    assert_eq!(s.buffer().lit_cells(), 1);
}

#[test]
fn project_scales_columns_by_k1_and_halves_rows() {
    let s = screen(40, 40, BackFaces::Discard);

    // ooz = 1 / (3 + 1) = 0.25
    let p = Point3::new(2.0, 2.0, 3.0);
    assert_eq!(s.cell_for(p, 10.0, 1.0), Some((25, 20, 0.25)));

    let p = Point3::new(-2.0, -2.0, 3.0);
    assert_eq!(s.cell_for(p, 10.0, 1.0), Some((15, 19, 0.25)));
}

#[test]
fn rows_ignore_k1_by_default() {
    let s = screen(10, 10, BackFaces::Discard);

    // ooz = 1 / (0 + 5) = 0.2, so the row is floor(2 * 0.2 / 2) + 5.
    let p = Point3::new(0.0, 2.0, 0.0);
    assert_eq!(s.cell_for(p, 10.0, 5.0), Some((5, 5, 0.2)));
    assert_eq!(s.cell_for(p, 1000.0, 5.0), Some((5, 5, 0.2)));
}

#[test]
fn perspective_vertical_scale() {
    let config = ScreenConfig::new(40, 40, GlyphRamp::default(),
        BackFaces::Discard).expect("Test screen should be valid.")
        .with_vertical_scale(VerticalScale::Perspective);
    let s = Screen::new(config);

    let p = Point3::new(2.0, 2.0, 3.0);
    assert_eq!(s.cell_for(p, 10.0, 1.0), Some((25, 22, 0.25)));

    let p = Point3::new(-2.0, -2.0, 3.0);
    assert_eq!(s.cell_for(p, 10.0, 1.0), Some((15, 17, 0.25)));

    let p = Point3::new(0.0, 2.0, 0.0);
    assert_eq!(s.cell_for(p, 10.0, 5.0).map(|(x, y, _)| (x, y)), Some((5, 7)));
}

#[test]
fn project_off_screen_is_discarded() {
    let mut s = screen(10, 10, BackFaces::Discard);
    let mut far_left = centered(1.0, 1.0);
    far_left.position.x = -100.0;
    let mut far_down = centered(1.0, 1.0);
    far_down.position.y = 100.0;

    s.project(&[far_left, far_down], 10.0, 0.0);
    assert_eq!(s.buffer().lit_cells(), 0);
}

#[test]
fn project_on_camera_plane_is_discarded() {
    let mut s = screen(10, 10, BackFaces::Discard);
    let mut on_plane = centered(1.0, 1.0);
    on_plane.position.z = -5.0;

    assert_eq!(s.cell_for(on_plane.position, 10.0, 5.0), None);
    s.project(&[on_plane], 10.0, 5.0);
    assert_eq!(s.buffer().lit_cells(), 0);
}

#[test]
fn project_behind_camera_never_wins() {
    let mut s = screen(10, 10, BackFaces::Discard);
    let mut behind = centered(1.0, 1.0);
    behind.position.z = -6.0;

    s.project(&[behind], 10.0, 5.0);
    assert_eq!(s.buffer().lit_cells(), 0);
}

#[test]
fn nearest_sample_wins() {
    let mut s = screen(10, 10, BackFaces::Discard);
    let samples = [centered(0.1, 0.1), centered(0.5, 0.5), centered(0.3, 0.3)];

    s.project(&samples, 10.0, 0.0);
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.5));
    assert!((s.buffer().depth_at(5, 5).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn nearest_sample_wins_in_any_stable_order() {
    let orders = [
        [0.1, 0.5, 0.3],
        [0.1, 0.3, 0.5],
        [0.3, 0.1, 0.5],
        [0.5, 0.1, 0.3],
    ];

    for order in orders.iter() {
        let mut s = screen(10, 10, BackFaces::Discard);
        let samples: Vec<Sample> = order.iter()
            .map(|&d| centered(d, d))
            .collect();

        s.project(&samples, 10.0, 0.0);
        assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.5));
    }
}

#[test]
fn equal_depth_keeps_first() {
    let mut s = screen(10, 10, BackFaces::Discard);

    s.project(&[centered(0.5, 0.2), centered(0.5, 0.9)], 10.0, 0.0);
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.2));
}

#[test]
fn dark_samples_discarded() {
    let mut s = screen(10, 10, BackFaces::Discard);

    s.project(&[centered(0.2, 0.7), centered(0.5, 0.0)], 10.0, 0.0);
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.7));
    assert_eq!(s.draw().chars().filter(|c| !c.is_whitespace()).count(), 1);
}

#[test]
fn dark_samples_retained() {
    let mut s = screen(10, 10, BackFaces::Retain);

    s.project(&[centered(0.2, 0.7), centered(0.5, 0.0)], 10.0, 0.0);
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.0));
    assert_eq!(s.buffer().depth_at(5, 5), Some(0.5));
    assert_eq!(s.draw(), "          \n".repeat(10));
}

#[test]
fn clear_resets_buffers() {
    let mut s = screen(10, 10, BackFaces::Discard);
    s.project(&[centered(0.5, 1.0)], 10.0, 0.0);
    s.clear();

    assert_eq!(s.buffer().depth_at(5, 5), Some(0.0));
    assert_eq!(s.buffer().luminosity_at(5, 5), Some(0.0));
}

#[test]
fn draw_is_row_major() {
    let mut s = screen(4, 3, BackFaces::Discard);

    // With ooz = 1 and k1 = 1 the cell is (x + 2, y / 2 + 1).
    let mut top_left = centered(1.0, 1.0);
    top_left.position.x = -2.0;
    top_left.position.y = -1.0;
    let mut bottom_right = centered(1.0, 1.0 / 12.0 + 1e-9);
    bottom_right.position.x = 1.0;
    bottom_right.position.y = 2.0;

    s.project(&[top_left, bottom_right], 1.0, 0.0);
    assert_eq!(s.draw(), "@   \n    \n   ,\n");
}

#[test]
fn new_screen_uses_aspect_rows() {
    let config = ScreenConfig::new(10, 10, GlyphRamp::default(),
        BackFaces::Discard).expect("Test screen should be valid.");

    assert_eq!(config.vertical_scale, VerticalScale::Aspect);
}

#[test]
fn reject_empty_screen() {
    assert!(ScreenConfig::new(0, 10, GlyphRamp::default(),
        BackFaces::Discard).is_err());
    assert!(ScreenConfig::new(10, 0, GlyphRamp::default(),
        BackFaces::Discard).is_err());
}
