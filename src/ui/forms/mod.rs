//! Form rendering module
//!
//! - `field_renderer`: bordered inputs with inline validation errors
//! - `step_view`: one wizard step, laid out by step kind

mod field_renderer;
mod step_view;

pub use step_view::draw_step;
