//! Album manifests.
//!
//! The full manifest doubles as the change ledger: `#v` index records in
//! forward segment order, followed by playable entries newest first. Block
//! playlists page the same entries for players that cap playlist length,
//! and the resume cache holds the index records on their own.

mod reader;
mod types;
mod writer;

pub use reader::{
    parse_index_line, parse_index_records, parse_manifest, read_manifest_records,
    read_resume_cache,
};
pub use types::{
    IndexRecord, MediaPlaylist, SegmentEntry, ENDLIST, ENTRY_DURATION, INDEX_TAG,
    PLAYLIST_VERSION, TARGET_DURATION,
};
pub use writer::{build_blocks, build_manifest, render_manifest, render_resume_cache, BlockPlaylist};
