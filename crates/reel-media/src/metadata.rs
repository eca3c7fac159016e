//! Typed view over the metadata chunks of a photo.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::{FormatError, FormatResult};
use crate::png::{MetaChunk, MetaTag};

/// Raw metadata fields extracted from one photo.
///
/// A field that never appeared is `None`; a field that appeared with an
/// empty payload is `Some("")`. The two are never conflated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataRecord {
    /// Capture timestamp, `YYYYMMDDhhmmss` optionally followed by millis.
    pub date: Option<String>,
    pub photographer: Option<String>,
    pub world: Option<String>,
    /// Tagged users keyed by name, with an optional handle.
    pub users: BTreeMap<String, Option<String>>,
}

impl MetadataRecord {
    /// Fold chunk payloads into a record. Later chunks overwrite earlier
    /// ones; users with the same name keep the last handle seen.
    pub fn from_chunks(chunks: &[MetaChunk], user_delimiter: &str) -> FormatResult<Self> {
        let mut record = Self::default();

        for chunk in chunks {
            let text = std::str::from_utf8(&chunk.payload).map_err(|_| {
                FormatError::InvalidText {
                    tag: chunk.tag.to_string(),
                }
            })?;

            match chunk.tag {
                MetaTag::Date => record.date = Some(text.to_string()),
                MetaTag::Photographer => record.photographer = Some(text.to_string()),
                MetaTag::World => record.world = Some(text.to_string()),
                MetaTag::User => record.add_user(text, user_delimiter),
            }
        }

        Ok(record)
    }

    /// Add a `vrCu` payload, splitting `name<delimiter>handle` at the last
    /// delimiter.
    pub fn add_user(&mut self, payload: &str, delimiter: &str) {
        let split = if delimiter.is_empty() {
            None
        } else {
            payload.rfind(delimiter)
        };

        match split {
            Some(pos) => {
                let name = &payload[..pos];
                let handle = &payload[pos + delimiter.len()..];
                self.users.insert(name.to_string(), Some(handle.to_string()));
            }
            None => {
                self.users.insert(payload.to_string(), None);
            }
        }
    }

    /// Whether any field was present at all.
    pub fn has_any(&self) -> bool {
        self.date.is_some()
            || self.photographer.is_some()
            || self.world.is_some()
            || !self.users.is_empty()
    }
}

/// Overlay metadata of a photo. Only exists when at least one field was
/// present in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PhotoMetadata {
    record: MetadataRecord,
}

impl PhotoMetadata {
    /// `None` means "no overlay metadata".
    pub fn from_record(record: MetadataRecord) -> Option<Self> {
        record.has_any().then_some(Self { record })
    }

    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    pub fn date(&self) -> Option<&str> {
        self.record.date.as_deref()
    }

    pub fn photographer(&self) -> Option<&str> {
        self.record.photographer.as_deref()
    }

    pub fn world(&self) -> Option<&str> {
        self.record.world.as_deref()
    }

    pub fn users(&self) -> &BTreeMap<String, Option<String>> {
        &self.record.users
    }

    /// Parse the capture stamp. Trailing millisecond digits are ignored.
    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        let date = self.record.date.as_deref()?;
        let stamp = date.get(..14)?;
        NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()
    }

    /// Capture stamp formatted as `YYYY-MM-DD hh:mm:ss`.
    pub fn readable_date(&self) -> Option<String> {
        self.capture_time()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
