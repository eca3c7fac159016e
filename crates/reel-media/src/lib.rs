//! Reel-Media: photo metadata, segmentation and HLS manifests
//!
//! This crate holds the pure parts of the album builder. Nothing here spawns
//! processes or writes media; the orchestrator in the `photoreel` crate
//! drives it.
//!
//! # Modules
//!
//! - `png` - PNG chunk walker that pulls out the `vrCd`/`vrCp`/`vrCw`/`vrCu` chunks
//! - `metadata` - Typed view of those chunks
//! - `photo` - Photos and their file-name fingerprints
//! - `segment` - Fixed-capacity partitioning of the photo list
//! - `detect` - First stale segment against the previous run
//! - `hls` - Manifest, block playlist and resume cache codec
//!
//! # Incremental builds
//!
//! Each segment is identified by the fingerprints of its first and last
//! photo. The manifest stores those pairs, so the next run can compare them
//! and only re-encode from the first segment whose boundaries moved.

pub mod detect;
pub mod error;
pub mod hls;
pub mod metadata;
pub mod photo;
pub mod png;
pub mod segment;

pub use detect::{find_resume_point, ResumePoint};
pub use error::{FormatError, FormatResult, ManifestError, ManifestResult};
pub use hls::{BlockPlaylist, IndexRecord, MediaPlaylist};
pub use metadata::{MetadataRecord, PhotoMetadata};
pub use photo::{Fingerprint, Photo};
pub use segment::{Segment, Segmenter, Segments};
