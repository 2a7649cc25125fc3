//! cellscope-detector: Detector panel reconstruction.
//!
//! This crate rebuilds a segmented detector image from its geometry:
//! - **Orientation** - classifies each panel into one of four reflections/rotations
//! - **Panel** - reorients a panel's pixel block, places it and remaps its peaks
//! - **Bad regions** - maps dead areas into clamped composed-image rectangles
//! - **Composer** - assembles the full detector image
//!
#![warn(missing_docs)]

mod bad_region;
mod composer;
mod error;
mod orientation;
mod panel;

pub use bad_region::{map_bad_region, BadRegionRect};
pub use composer::{ComposeConfig, ComposedImage, ImageComposer};
pub use error::{DetectorError, Result};
pub use orientation::Orientation;
pub use panel::{CenterOffset, Panel, PanelLayout, ResolvedPanel};
