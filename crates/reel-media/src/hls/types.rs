//! HLS playlist structures.

use std::fmt::{self, Write};

use crate::photo::Fingerprint;
use crate::segment::Segment;

/// Prefix of the index-record comment lines (`#v<index>,<start>,<end>`).
pub const INDEX_TAG: &str = "#v";

/// Playlist version written in every header.
pub const PLAYLIST_VERSION: u32 = 3;

/// Target duration of every entry, in seconds.
pub const TARGET_DURATION: u32 = 1;

/// Duration announced for every entry, in seconds.
pub const ENTRY_DURATION: f64 = 1.0;

/// End-of-playlist marker.
pub const ENDLIST: &str = "#EXT-X-ENDLIST";

/// Boundary fingerprints of one segment as persisted in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexRecord {
    pub index: usize,
    pub start: Fingerprint,
    pub end: Fingerprint,
}

impl From<&Segment<'_>> for IndexRecord {
    fn from(segment: &Segment<'_>) -> Self {
        Self {
            index: segment.index(),
            start: segment.start_fingerprint().clone(),
            end: segment.end_fingerprint().clone(),
        }
    }
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{},{},{}", INDEX_TAG, self.index, self.start, self.end)
    }
}

/// A playable entry in the playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEntry {
    /// Duration in seconds.
    pub duration: f64,
    /// Media unit URI, relative to the playlist.
    pub uri: String,
    /// Discontinuity before this entry.
    pub discontinuity: bool,
}

impl SegmentEntry {
    /// An entry for one encoded segment. Every segment is its own encode, so
    /// each one starts a discontinuity.
    pub fn media(uri: impl Into<String>) -> Self {
        Self {
            duration: ENTRY_DURATION,
            uri: uri.into(),
            discontinuity: true,
        }
    }
}

/// Media playlist carrying both playable entries and index records.
#[derive(Debug, Clone)]
pub struct MediaPlaylist {
    /// Target duration in seconds.
    pub target_duration: u32,
    /// Media sequence number.
    pub media_sequence: u32,
    /// Index records, in forward segment order.
    pub index: Vec<IndexRecord>,
    /// Playable entries, in playback order.
    pub segments: Vec<SegmentEntry>,
    /// Whether this is an ended playlist.
    pub ended: bool,
}

impl MediaPlaylist {
    /// Create an empty event playlist with the fixed album header.
    pub fn event() -> Self {
        Self {
            target_duration: TARGET_DURATION,
            media_sequence: 0,
            index: Vec::new(),
            segments: Vec::new(),
            ended: true,
        }
    }

    /// Render to M3U8 string.
    pub fn render(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);

        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "#EXTM3U")?;
        writeln!(out, "#EXT-X-VERSION:{PLAYLIST_VERSION}")?;
        writeln!(out, "#EXT-X-TARGETDURATION:{}", self.target_duration)?;
        writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", self.media_sequence)?;

        writeln!(out, "#EXT-X-PLAYLIST-TYPE:EVENT")?;
        writeln!(out)?;

        for record in &self.index {
            writeln!(out, "{record}")?;
        }

        for segment in &self.segments {
            if segment.discontinuity {
                writeln!(out, "#EXT-X-DISCONTINUITY")?;
            }
            writeln!(out, "#EXTINF:{:.6},", segment.duration)?;
            writeln!(out, "{}", segment.uri)?;
        }

        if self.ended {
            writeln!(out, "{ENDLIST}")?;
        }

        Ok(())
    }
}

impl Default for MediaPlaylist {
    fn default() -> Self {
        Self::event()
    }
}
