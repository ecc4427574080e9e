//! Application state module

mod app_state;
mod forms;
mod response;
mod template;

pub use app_state::*;
pub use forms::*;
pub use response::*;
pub use template::*;
