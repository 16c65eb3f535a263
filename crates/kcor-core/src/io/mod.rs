pub mod cube_writer;
pub mod raw;

pub use raw::{discover_timestamps, stream_filename, RawFrameReader, StreamFiles};
