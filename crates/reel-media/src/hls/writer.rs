//! Manifest, block playlist and resume cache rendering.

use super::types::{IndexRecord, MediaPlaylist, SegmentEntry};

/// Build the full album manifest.
///
/// Index records are written in forward order; playable entries in reverse,
/// so the newest segment plays first. Rendering is deterministic: the same
/// records always produce the same bytes.
pub fn build_manifest<F>(records: &[IndexRecord], entry_name: F) -> MediaPlaylist
where
    F: Fn(usize) -> String,
{
    let mut playlist = MediaPlaylist::event();
    playlist.index = records.to_vec();
    playlist.segments = records
        .iter()
        .rev()
        .map(|record| SegmentEntry::media(entry_name(record.index)))
        .collect();
    playlist
}

/// Render the full album manifest.
pub fn render_manifest<F>(records: &[IndexRecord], entry_name: F) -> String
where
    F: Fn(usize) -> String,
{
    build_manifest(records, entry_name).render()
}

/// Render the resume cache: index-record lines only.
pub fn render_resume_cache(records: &[IndexRecord]) -> String {
    let mut out = String::with_capacity(records.len() * 56);
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

/// One fixed-size page of the album for players that cap playlist length.
#[derive(Debug, Clone)]
pub struct BlockPlaylist {
    /// 0-based block number.
    pub number: usize,
    pub playlist: MediaPlaylist,
}

impl BlockPlaylist {
    /// `<prefix>_<number:05>.m3u8`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}_{:05}.m3u8", self.number)
    }

    pub fn render(&self) -> String {
        self.playlist.render()
    }
}

/// Split the album into `ceil(S / block_size)` block playlists.
///
/// Blocks are cut from the reverse (newest first) order used by the full
/// manifest. Each block lists `block_size` entries; the last one is padded
/// with `placeholder` so every block has the same length. Block playlists
/// carry no index records. A zero block size yields no blocks.
pub fn build_blocks<F>(
    segment_count: usize,
    block_size: usize,
    entry_name: F,
    placeholder: &str,
) -> Vec<BlockPlaylist>
where
    F: Fn(usize) -> String,
{
    if block_size == 0 {
        return Vec::new();
    }

    let order: Vec<usize> = (0..segment_count).rev().collect();

    order
        .chunks(block_size)
        .enumerate()
        .map(|(number, indices)| {
            let mut playlist = MediaPlaylist::event();
            playlist.segments = indices
                .iter()
                .map(|&i| SegmentEntry::media(entry_name(i)))
                .collect();

            let padding = block_size - indices.len();
            playlist.segments.extend(
                std::iter::repeat_with(|| SegmentEntry::media(placeholder)).take(padding),
            );

            BlockPlaylist { number, playlist }
        })
        .collect()
}
