pub mod consts;

pub mod tuple;
pub mod matrix;
pub mod light;

pub mod animation;
pub mod geometry;

pub mod glyph;
pub mod screen;

pub mod command;
pub mod scene;

pub mod render_loop;
pub mod terminal;

const FEQ_EPSILON: f64 = 0.0001;
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
