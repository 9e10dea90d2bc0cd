//! Client side of the support widget: the stream consumer and the
//! in-memory session state it drives.

mod consumer;
mod session;

pub use consumer::{DeltaAccumulator, stream_chat};
pub use session::{ChatWidget, WidgetMessage};
