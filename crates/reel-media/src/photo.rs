//! Photos and their file-name fingerprints.

use std::fmt;
use std::path::{Path, PathBuf};

use reel_core::config::FingerprintConfig;

use crate::error::{FormatError, FormatResult};

/// Opaque, comparable token identifying a photo's position in the album.
///
/// Built from a fixed character window of the file name (the capture time
/// in the screenshot tool's naming scheme). Nothing outside [`Fingerprint::
/// from_file_name`] may rely on its structure; the change detector only
/// compares tokens for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Cut the fingerprint window out of a file name.
    ///
    /// `offset` and `length` count characters. A name shorter than `offset`
    /// yields the whole name; a name shorter than `offset + length` yields
    /// whatever follows `offset`. Tokens containing `,`, `\r` or `\n` are
    /// rejected because index records are comma-separated lines.
    pub fn from_file_name(name: &str, rule: &FingerprintConfig) -> FormatResult<Self> {
        let char_count = name.chars().count();
        let token: String = if char_count <= rule.offset {
            name.to_string()
        } else {
            name.chars().skip(rule.offset).take(rule.length).collect()
        };
        Self::parse(&token).ok_or_else(|| FormatError::InvalidFingerprint {
            name: name.to_string(),
        })
    }

    /// Accept a token read back from a manifest.
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() || token.contains([',', '\r', '\n']) {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered photo. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    path: PathBuf,
    fingerprint: Fingerprint,
}

impl Photo {
    /// Build a photo, deriving its fingerprint from the file name.
    pub fn new(path: impl Into<PathBuf>, rule: &FingerprintConfig) -> FormatResult<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fingerprint = Fingerprint::from_file_name(&name, rule)?;
        Ok(Self { path, fingerprint })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// File name for logs.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> FingerprintConfig {
        FingerprintConfig::default()
    }

    #[test]
    fn default_rule_extracts_capture_time() {
        let fp = Fingerprint::from_file_name(
            "VRChat_1920x1080_2024-01-01_12-00-00.000.png",
            &rule(),
        )
        .unwrap();
        assert_eq!(fp.as_str(), "2024-01-01_12-00-00.000");
    }

    #[test]
    fn short_name_uses_remainder() {
        let fp = Fingerprint::from_file_name("VRChat_1920x1080_2024.png", &rule()).unwrap();
        assert_eq!(fp.as_str(), "2024.png");
    }

    #[test]
    fn name_shorter_than_offset_uses_whole_name() {
        let fp = Fingerprint::from_file_name("shot.png", &rule()).unwrap();
        assert_eq!(fp.as_str(), "shot.png");
    }

    #[test]
    fn offsets_count_characters() {
        let rule = FingerprintConfig {
            offset: 2,
            length: 3,
        };
        let fp = Fingerprint::from_file_name("写真abcdef", &rule).unwrap();
        assert_eq!(fp.as_str(), "abc");
    }

    #[test]
    fn comma_in_window_rejected() {
        let rule = FingerprintConfig {
            offset: 0,
            length: 5,
        };
        assert!(matches!(
            Fingerprint::from_file_name("a,b,c.png", &rule),
            Err(FormatError::InvalidFingerprint { .. })
        ));
    }

    #[test]
    fn parse_rejects_empty_and_separators() {
        assert!(Fingerprint::parse("").is_none());
        assert!(Fingerprint::parse("a,b").is_none());
        assert!(Fingerprint::parse("a\nb").is_none());
        assert!(Fingerprint::parse("2024-01-01_12-00-00.000").is_some());
    }

    #[test]
    fn photo_exposes_path_and_fingerprint() {
        let photo = Photo::new(
            "/in/VRChat_1920x1080_2024-01-01_12-00-00.000.png",
            &rule(),
        )
        .unwrap();
        assert_eq!(photo.fingerprint().as_str(), "2024-01-01_12-00-00.000");
        assert_eq!(
            photo.file_name(),
            "VRChat_1920x1080_2024-01-01_12-00-00.000.png"
        );
        assert_eq!(
            photo.path(),
            Path::new("/in/VRChat_1920x1080_2024-01-01_12-00-00.000.png")
        );
    }
}
