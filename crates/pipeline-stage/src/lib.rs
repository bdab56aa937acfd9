//! The per-stage worker thread and the attach/place_work/finalize protocol
//! that wires stages into a pipeline and tears them down in order.

mod error;
mod stage;
mod transform;

pub use error::StageError;
pub use stage::Stage;
pub use transform::{is_sentinel, Transform, SENTINEL};
