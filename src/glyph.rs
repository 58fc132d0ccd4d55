use std::fmt;

use crate::consts::GLYPH_RAMP;
use crate::scene::ConfigError;

/// The glyph drawn for a cell with nothing lit in it.
pub const BLANK: char = ' ';

/// An ordered set of glyphs, from dimmest to brightest.
///
/// Brightness in `(0, 1)` is spread evenly across the ramp; anything at or
/// above `1.0` lands on the last glyph, and anything not strictly positive is
/// drawn as `BLANK`.
///
/// # Examples
///
/// ```
/// # use ascii_donut::glyph::{ GlyphRamp, BLANK };
/// let ramp = GlyphRamp::new(".:#").unwrap();
///
/// assert_eq!(ramp.glyph_for(0.0), BLANK);
/// assert_eq!(ramp.glyph_for(0.2), '.');
/// assert_eq!(ramp.glyph_for(0.5), ':');
/// assert_eq!(ramp.glyph_for(1.0), '#');
/// assert_eq!(ramp.glyph_for(7.5), '#');
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRamp {
    glyphs: Vec<char>,
}

impl Default for GlyphRamp {
    fn default() -> GlyphRamp {
        GlyphRamp { glyphs: GLYPH_RAMP.chars().collect() }
    }
}

impl GlyphRamp {
    /// Creates a ramp from the characters of `glyphs`, which must not be
    /// empty.
    pub fn new(glyphs: &str) -> Result<GlyphRamp, ConfigError> {
        if glyphs.is_empty() {
            return Err(ConfigError::Invalid("glyph_ramp must not be empty".into()));
        }

        Ok(GlyphRamp { glyphs: glyphs.chars().collect() })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Quantizes a luminosity to a glyph.
    pub fn glyph_for(&self, luminosity: f64) -> char {
        // Also catches NaN.
        if !(luminosity > 0.0) {
            return BLANK;
        }

        // Float-to-int casts saturate, so huge values clamp here too.
        let index = (luminosity * self.glyphs.len() as f64).floor() as usize;
        self.glyphs[index.min(self.glyphs.len() - 1)]
    }
}

impl fmt::Display for GlyphRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for glyph in self.glyphs.iter() {
            write!(f, "{}", glyph)?;
        }

        Ok(())
    }
}

#[test]
fn zero_is_blank() {
    let ramp = GlyphRamp::default();

    assert_eq!(ramp.glyph_for(0.0), BLANK);
    assert_eq!(ramp.glyph_for(-0.0), BLANK);
    assert_eq!(ramp.glyph_for(f64::NAN), BLANK);
}

#[test]
fn one_is_last_glyph() {
    let ramp = GlyphRamp::default();

    assert_eq!(ramp.len(), 12);
    assert_eq!(ramp.glyph_for(1.0), '@');
}

#[test]
fn overbright_clamps() {
    let ramp = GlyphRamp::default();

    assert_eq!(ramp.glyph_for(1.5), '@');
    assert_eq!(ramp.glyph_for(f64::INFINITY), '@');
}

#[test]
fn ramp_is_spread_evenly() {
    let ramp = GlyphRamp::default();

    assert_eq!(ramp.glyph_for(1e-12), '.');
    assert_eq!(ramp.glyph_for(1.0 / 12.0 - 1e-9), '.');
    assert_eq!(ramp.glyph_for(1.0 / 12.0 + 1e-9), ',');
    assert_eq!(ramp.glyph_for(0.5), '=');
    assert_eq!(ramp.glyph_for(0.99), '@');
}

#[test]
fn single_glyph_ramp() {
    let ramp = GlyphRamp::new("#").expect("non-empty ramp");

    assert_eq!(ramp.glyph_for(0.01), '#');
    assert_eq!(ramp.glyph_for(1.0), '#');
    assert_eq!(ramp.glyph_for(0.0), BLANK);
}

#[test]
fn empty_ramp_is_rejected() {
    assert!(GlyphRamp::new("").is_err());
}

#[test]
fn ramp_to_string() {
    assert_eq!(GlyphRamp::default().to_string(), GLYPH_RAMP);
}
