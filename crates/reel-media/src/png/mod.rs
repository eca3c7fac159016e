//! PNG ancillary chunk extraction.
//!
//! Only the chunk framing is parsed: signature, `length`/`type` headers,
//! payloads of the four metadata tags and the `IEND` terminator. Pixel data
//! and compression are never touched.

mod cursor;
mod reader;

pub use cursor::ByteCursor;
pub use reader::{read_chunks, read_metadata, read_metadata_file, MetaChunk};

/// The 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Chunk type that terminates the stream.
pub const IEND: [u8; 4] = *b"IEND";

/// Metadata chunk tags written by the capture tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaTag {
    /// `vrCd`: capture timestamp.
    Date,
    /// `vrCp`: photographer.
    Photographer,
    /// `vrCw`: world name.
    World,
    /// `vrCu`: a tagged user, optionally with a handle.
    User,
}

impl MetaTag {
    /// Map a chunk type to a known tag.
    pub fn from_bytes(tag: [u8; 4]) -> Option<Self> {
        match &tag {
            b"vrCd" => Some(Self::Date),
            b"vrCp" => Some(Self::Photographer),
            b"vrCw" => Some(Self::World),
            b"vrCu" => Some(Self::User),
            _ => None,
        }
    }

    /// The chunk type as text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "vrCd",
            Self::Photographer => "vrCp",
            Self::World => "vrCw",
            Self::User => "vrCu",
        }
    }
}

impl std::fmt::Display for MetaTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
