//! # reel-av
//!
//! External tool handling for photoreel.
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg, honouring a
//!   configured override path.
//! - **Command execution** ([`ToolCommand`]) -- async builder with optional timeout
//!   support for running external processes.
//! - **Segment encoding** ([`SegmentEncoder`], [`FfmpegEncoder`]) -- turn one
//!   segment's frame sequence into an HLS media unit.

pub mod command;
pub mod encoder;
pub mod tools;

pub use command::{ToolCommand, ToolOutput};
pub use encoder::{frame_file_name, EncodeJob, FfmpegEncoder, SegmentEncoder};
pub use tools::{ToolInfo, ToolRegistry};
