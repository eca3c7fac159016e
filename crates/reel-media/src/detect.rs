//! Finds the first segment whose boundaries differ from the last run.

use crate::hls::IndexRecord;
use crate::segment::Segment;

/// Where an incremental build has to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ResumePoint {
    /// Every current segment matches its prior record.
    UpToDate,
    /// Segments from this index onward must be rebuilt.
    RebuildFrom(usize),
}

impl ResumePoint {
    /// First stale segment; `segment_count` when nothing is stale.
    pub fn index(&self, segment_count: usize) -> usize {
        match *self {
            ResumePoint::UpToDate => segment_count,
            ResumePoint::RebuildFrom(i) => i.min(segment_count),
        }
    }
}

/// Walk the current segments and the prior records in lock-step.
///
/// Stops at the first position with no prior record or with a different
/// start or end fingerprint; that segment itself is stale. Prior records
/// past the last current segment are ignored.
pub fn find_resume_point<'a, I>(current: I, prior: &[IndexRecord]) -> ResumePoint
where
    I: IntoIterator<Item = Segment<'a>>,
{
    for (i, segment) in current.into_iter().enumerate() {
        let Some(record) = prior.get(i) else {
            tracing::debug!(segment = i, "no prior record");
            return ResumePoint::RebuildFrom(i);
        };

        if segment.start_fingerprint() != &record.start
            || segment.end_fingerprint() != &record.end
        {
            tracing::debug!(
                segment = i,
                prior_start = %record.start,
                prior_end = %record.end,
                start = %segment.start_fingerprint(),
                end = %segment.end_fingerprint(),
                "segment boundaries changed"
            );
            return ResumePoint::RebuildFrom(i);
        }
    }

    ResumePoint::UpToDate
}
