//! Dialog components for TUI

mod base;
mod token_dialog;

pub use token_dialog::render_token_dialog;
