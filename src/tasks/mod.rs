//! Async tasks for the scope firmware.
//!
//! - `flush`: display region flush task (DMA transfers)

pub mod flush;

pub use flush::{FLUSH_DONE, FLUSH_SIGNAL, FlushRequest, RegionBuffers, display_flush_task};
