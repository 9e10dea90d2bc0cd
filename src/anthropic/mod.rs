mod messages;
pub use messages::{Delta, StreamEvent, UpstreamFailure, stream_messages, transcode_stream};
