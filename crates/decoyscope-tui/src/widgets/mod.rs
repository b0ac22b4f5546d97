//! Small reusable pieces shared by screens and overlays.

pub mod placeholder;
pub mod sub_tabs;
