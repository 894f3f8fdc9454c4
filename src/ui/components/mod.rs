//! Reusable UI components

mod button;
mod dialog;

pub use button::{render_button, ButtonState, BUTTON_HEIGHT};
pub use dialog::render_token_dialog;
