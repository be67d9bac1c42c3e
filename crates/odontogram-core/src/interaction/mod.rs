//! Interaction surface of the 2D chart.
//!
//! Click targets, the radial context menu, and the controller that turns
//! pointer events into [`ChartCommand`](crate::chart::ChartCommand)s.

mod controller;
mod radial;
mod targets;

pub use controller::*;
pub use radial::*;
pub use targets::*;
