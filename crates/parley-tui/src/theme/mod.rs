//! Colors and styles shared by the widgets.
//!
//! - `palette`: Raw color constants
//! - `styles`: Semantic style builder functions

pub mod palette;
pub mod styles;
