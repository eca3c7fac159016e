//! Chunk walker for the four metadata tags.

use std::path::Path;

use bytes::Bytes;

use super::{ByteCursor, MetaTag, IEND, PNG_SIGNATURE};
use crate::error::{FormatError, FormatResult};
use crate::metadata::MetadataRecord;

/// Length of the CRC that trails every chunk payload.
const CRC_LEN: usize = 4;

/// A metadata chunk payload as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaChunk {
    pub tag: MetaTag,
    /// Raw payload; the declared length is authoritative, there is no
    /// terminator.
    pub payload: Bytes,
}

/// Walk the chunks of a PNG stream and collect the metadata payloads.
///
/// Stops at `IEND` and never looks at anything after it. Unknown chunks are
/// skipped without copying their payload. CRCs are skipped, not verified.
pub fn read_chunks(data: impl Into<Bytes>) -> FormatResult<Vec<MetaChunk>> {
    let mut cursor = ByteCursor::new(data);

    let signature = cursor
        .read_array::<8>()
        .map_err(|_| FormatError::BadSignature)?;
    if signature != PNG_SIGNATURE {
        return Err(FormatError::BadSignature);
    }

    let mut chunks = Vec::new();
    loop {
        let length = cursor.read_u32()? as usize;
        let tag = cursor.read_array::<4>()?;

        if tag == IEND {
            break;
        }

        match MetaTag::from_bytes(tag) {
            Some(tag) => {
                let payload = cursor.read_exact(length)?;
                cursor.skip(CRC_LEN)?;
                chunks.push(MetaChunk { tag, payload });
            }
            None => {
                cursor.skip(length.saturating_add(CRC_LEN))?;
            }
        }
    }

    tracing::trace!(
        chunks = chunks.len(),
        consumed = cursor.position(),
        "PNG chunk walk finished"
    );

    Ok(chunks)
}

/// Parse a PNG stream into a [`MetadataRecord`].
///
/// `user_delimiter` separates a tagged user's name from their handle inside a
/// `vrCu` payload.
pub fn read_metadata(data: impl Into<Bytes>, user_delimiter: &str) -> FormatResult<MetadataRecord> {
    let chunks = read_chunks(data)?;
    MetadataRecord::from_chunks(&chunks, user_delimiter)
}

/// Read a photo from disk and parse its metadata chunks.
pub fn read_metadata_file(path: &Path, user_delimiter: &str) -> FormatResult<MetadataRecord> {
    let data = std::fs::read(path)?;
    read_metadata(data, user_delimiter)
}
