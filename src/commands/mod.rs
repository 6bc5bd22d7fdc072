//! Event handlers a front-end wires its gestures to.
//!
//! Each handler maps one UI gesture onto [`AppState`](crate::core::AppState)
//! and applies the error policy: intake and slider rejections become an
//! [`Alert`](crate::core::StateEvent::Alert), everything else is logged.
//! - [`on_drop`] / [`on_files_selected`]: intake
//! - [`on_compress`]: compress every pending file
//! - [`on_download_file`] / [`on_download_all`]: save results

mod events;

pub use events::*;

/// Attribution shown under the drop zone.
pub const FOOTER: &str = "Created with Rust, the `image` crate and the `zip` crate.";
