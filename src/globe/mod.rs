//! Globe animation engine
//!
//! Pure geometry and state: map projection, connector curves, camera orbit
//! and the staged intro/cycle sequencing. Nothing in here touches the
//! terminal; `render` turns a [`Director`] into braille.

pub mod camera;
pub mod connectors;
pub mod curve;
pub mod data;
pub mod director;
pub mod dots;
pub mod math;
pub mod points;
pub mod projection;

pub use data::Dataset;
pub use director::{Director, Phase};
