//! Form rendering module
//!
//! - `field_renderer`: line builders for single fields
//! - `inspection_form`: the template form view

mod field_renderer;
mod inspection_form;

pub use inspection_form::draw_inspection_form;
