//! Graph engine: trace storage, viewport state, and the region
//! planning/painting renderer.

pub mod render;
pub mod trace;
pub mod window;

pub use render::{FramePlan, GraphRenderer};
pub use trace::{Span, TraceStore, merge};
pub use window::GraphWindow;
