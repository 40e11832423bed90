//! User interface module.
//!
//! - `overlay`: the preview card opened by clicking a mini figure.
pub mod overlay;
