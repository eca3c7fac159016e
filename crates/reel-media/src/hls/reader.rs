//! Reading index records back from a manifest or resume cache.
//!
//! Parsing fails closed: an unreadable or malformed source yields fewer
//! prior records, never more, so the worst outcome is extra rebuild work.

use std::io;
use std::path::Path;

use crate::error::{ManifestError, ManifestResult};
use crate::photo::Fingerprint;

use super::types::{IndexRecord, ENDLIST, INDEX_TAG};

/// Parse one `#v<index>,<start>,<end>` line.
pub fn parse_index_line(line: &str) -> Option<IndexRecord> {
    let rest = line.strip_prefix(INDEX_TAG)?;
    let mut parts = rest.splitn(3, ',');

    let index = parts.next()?.parse::<usize>().ok()?;
    let start = Fingerprint::parse(parts.next()?)?;
    let end = Fingerprint::parse(parts.next()?)?;

    Some(IndexRecord { index, start, end })
}

/// Collect index records from text.
///
/// Lines that are not index records are ignored. Records must run 0, 1, 2...
/// in order; the first malformed or out-of-sequence record ends the scan and
/// only the records before it are returned.
pub fn parse_index_records(text: &str) -> Vec<IndexRecord> {
    let mut records = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if !line.starts_with(INDEX_TAG) {
            continue;
        }

        match parse_index_line(line) {
            Some(record) if record.index == records.len() => records.push(record),
            Some(record) => {
                tracing::warn!(
                    line = line_no + 1,
                    expected = records.len(),
                    found = record.index,
                    "index record out of sequence, ignoring the rest"
                );
                break;
            }
            None => {
                tracing::warn!(line = line_no + 1, "malformed index record, ignoring the rest");
                break;
            }
        }
    }

    records
}

/// Parse a full album manifest.
///
/// Besides the record rules of [`parse_index_records`], a manifest must start
/// with `#EXTM3U`, end with the end-list marker and list at least one entry
/// per record. A manifest that fails those checks was probably cut short
/// while being written and is reported as corrupt.
pub fn parse_manifest(text: &str) -> ManifestResult<Vec<IndexRecord>> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

    if lines.next() != Some("#EXTM3U") {
        return Err(ManifestError::corrupt("missing #EXTM3U header"));
    }

    let mut entries = 0usize;
    let mut ended = false;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if line == ENDLIST {
            ended = true;
        } else if !line.starts_with('#') {
            entries += 1;
        }
    }

    if !ended {
        return Err(ManifestError::corrupt("missing end-list marker"));
    }

    let records = parse_index_records(text);
    if entries < records.len() {
        return Err(ManifestError::corrupt(format!(
            "{} index records but only {} entries",
            records.len(),
            entries
        )));
    }

    Ok(records)
}

fn read_text(path: &Path) -> ManifestResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ManifestError::Missing(path.to_path_buf()),
        _ => ManifestError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Read prior records from a full manifest file.
pub fn read_manifest_records(path: &Path) -> ManifestResult<Vec<IndexRecord>> {
    parse_manifest(&read_text(path)?)
}

/// Read prior records from a resume cache file.
pub fn read_resume_cache(path: &Path) -> ManifestResult<Vec<IndexRecord>> {
    Ok(parse_index_records(&read_text(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hls::writer::{render_manifest, render_resume_cache};

    fn record(i: usize) -> IndexRecord {
        IndexRecord {
            index: i,
            start: Fingerprint::parse(&format!("2024-01-{:02}_00-00-00.000", i + 1)).unwrap(),
            end: Fingerprint::parse(&format!("2024-01-{:02}_23-59-59.999", i + 1)).unwrap(),
        }
    }

    fn name(i: usize) -> String {
        format!("video-{i:05}_00000.ts")
    }

    #[test]
    fn test_manifest_round_trip() {
        let records: Vec<_> = (0..4).map(record).collect();
        let text = render_manifest(&records, name);
        assert_eq!(parse_manifest(&text).unwrap(), records);
    }

    #[test]
    fn test_resume_cache_round_trip() {
        let records: Vec<_> = (0..4).map(record).collect();
        assert_eq!(parse_index_records(&render_resume_cache(&records)), records);
    }

    #[test]
    fn test_parse_index_line() {
        let r = parse_index_line("#v3,a,b").unwrap();
        assert_eq!(r.index, 3);
        assert_eq!(r.start.as_str(), "a");
        assert_eq!(r.end.as_str(), "b");

        assert!(parse_index_line("#vx,a,b").is_none());
        assert!(parse_index_line("#v1,a").is_none());
        assert!(parse_index_line("#v1,a,b,c").is_none());
        assert!(parse_index_line("#v1,,b").is_none());
        assert!(parse_index_line("#EXTINF:1.0,").is_none());
    }

    #[test]
    fn test_gap_keeps_prefix() {
        let text = "#v0,a,b\n#v1,c,d\n#v3,e,f\n#v4,g,h\n";
        let records = parse_index_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].start.as_str(), "c");
    }

    #[test]
    fn test_malformed_line_keeps_prefix() {
        let text = "#v0,a,b\n#v1,broken\n#v2,e,f\n";
        assert_eq!(parse_index_records(text).len(), 1);
    }

    #[test]
    fn test_non_record_lines_ignored() {
        let text = "#EXTM3U\n\n#v0,a,b\n# comment\nfoo.ts\n#v1,c,d\r\n";
        let records = parse_index_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].end.as_str(), "d");
    }

    #[test]
    fn test_duplicate_index_stops() {
        let text = "#v0,a,b\n#v0,a,b\n";
        assert_eq!(parse_index_records(text).len(), 1);
    }

    #[test]
    fn test_truncated_manifest_is_corrupt() {
        let records: Vec<_> = (0..4).map(record).collect();
        let text = render_manifest(&records, name);

        let without_end = text.replace("#EXT-X-ENDLIST\n", "");
        assert!(matches!(
            parse_manifest(&without_end),
            Err(ManifestError::Corrupt(_))
        ));

        // Records written, entries cut off mid-way.
        let cut = text.find("#EXT-X-DISCONTINUITY").unwrap();
        let mut partial = text[..cut].to_string();
        partial.push_str("#EXT-X-DISCONTINUITY\n#EXTINF:1.000000,\nvideo-00003_00000.ts\n");
        partial.push_str("#EXT-X-ENDLIST\n");
        assert!(matches!(
            parse_manifest(&partial),
            Err(ManifestError::Corrupt(_))
        ));
    }

    #[test]
    fn test_missing_header_is_corrupt() {
        assert!(matches!(
            parse_manifest("#v0,a,b\nx.ts\n#EXT-X-ENDLIST\n"),
            Err(ManifestError::Corrupt(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.m3u8");
        assert!(matches!(
            read_manifest_records(&path),
            Err(ManifestError::Missing(_))
        ));
        assert!(matches!(
            read_resume_cache(&path),
            Err(ManifestError::Missing(_))
        ));
    }

    #[test]
    fn test_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<_> = (0..2).map(record).collect();

        let manifest = dir.path().join("album.m3u8");
        std::fs::write(&manifest, render_manifest(&records, name)).unwrap();
        assert_eq!(read_manifest_records(&manifest).unwrap(), records);

        let cache = dir.path().join("album.index");
        std::fs::write(&cache, render_resume_cache(&records)).unwrap();
        assert_eq!(read_resume_cache(&cache).unwrap(), records);
    }
}
