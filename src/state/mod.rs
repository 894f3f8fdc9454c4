//! Application state module

mod app_state;
mod content_cache;
mod forms;

pub use app_state::*;
pub use content_cache::*;
pub use forms::*;
