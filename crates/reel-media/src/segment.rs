//! Fixed-capacity partitioning of the ordered photo list.
//!
//! Segment `i` covers photos `[i*N, min((i+1)*N, len))`. Because segments are
//! cut from contiguous runs, an insertion in the middle of the album shifts
//! every later boundary, while appended photos only touch the tail.

use std::iter::{Enumerate, FusedIterator};
use std::slice::Chunks;

use crate::photo::{Fingerprint, Photo};

/// A contiguous, non-empty run of photos mapped to one media unit.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    index: usize,
    photos: &'a [Photo],
}

impl<'a> Segment<'a> {
    /// 0-based position in the album.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn photos(&self) -> &'a [Photo] {
        self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn start_fingerprint(&self) -> &'a Fingerprint {
        // Chunks never yields an empty slice.
        self.photos[0].fingerprint()
    }

    pub fn end_fingerprint(&self) -> &'a Fingerprint {
        self.photos[self.photos.len() - 1].fingerprint()
    }
}

/// Splits photo lists into segments of at most `capacity` photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    capacity: usize,
}

impl Segmenter {
    /// Returns `None` for a zero capacity.
    pub fn new(capacity: usize) -> Option<Self> {
        (capacity > 0).then_some(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lazily partition `photos`. The iterator is cheap to clone, so the
    /// same partition can be walked more than once.
    pub fn segment<'a>(&self, photos: &'a [Photo]) -> Segments<'a> {
        Segments {
            inner: photos.chunks(self.capacity).enumerate(),
        }
    }

    /// `ceil(photo_count / capacity)`.
    pub fn segment_count(&self, photo_count: usize) -> usize {
        photo_count.div_ceil(self.capacity)
    }
}

/// Iterator returned by [`Segmenter::segment`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    inner: Enumerate<Chunks<'a, Photo>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(index, photos)| Segment { index, photos })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Segments<'_> {}

impl FusedIterator for Segments<'_> {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reel_core::config::FingerprintConfig;

    /// Photos named `p00000` .. whose fingerprint is the whole name.
    pub(crate) fn photos(count: usize) -> Vec<Photo> {
        let rule = FingerprintConfig {
            offset: 0,
            length: 64,
        };
        (0..count)
            .map(|i| Photo::new(format!("/in/p{i:05}"), &rule).unwrap())
            .collect()
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(Segmenter::new(0).is_none());
    }

    #[test]
    fn counts_and_sizes() {
        for capacity in 1..=10 {
            let segmenter = Segmenter::new(capacity).unwrap();
            for count in 0..40 {
                let photos = photos(count);
                let segments: Vec<_> = segmenter.segment(&photos).collect();
                assert_eq!(segments.len(), count.div_ceil(capacity));
                assert_eq!(segments.len(), segmenter.segment_count(count));
                assert!(segments.iter().all(|s| !s.is_empty() && s.len() <= capacity));
                assert_eq!(segments.iter().map(Segment::len).sum::<usize>(), count);
            }
        }
    }

    #[test]
    fn boundaries_follow_index() {
        let photos = photos(20);
        let segments: Vec<_> = Segmenter::new(9).unwrap().segment(&photos).collect();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].index(), 1);
        assert_eq!(segments[1].start_fingerprint().as_str(), "p00009");
        assert_eq!(segments[1].end_fingerprint().as_str(), "p00017");
        assert_eq!(segments[2].len(), 2);
        assert_eq!(segments[2].start_fingerprint().as_str(), "p00018");
        assert_eq!(segments[2].end_fingerprint().as_str(), "p00019");
    }

    #[test]
    fn single_photo_segment_has_equal_bounds() {
        let photos = photos(1);
        let segment = Segmenter::new(9).unwrap().segment(&photos).next().unwrap();
        assert_eq!(segment.start_fingerprint(), segment.end_fingerprint());
    }

    #[test]
    fn iterator_is_restartable() {
        let photos = photos(12);
        let segments = Segmenter::new(5).unwrap().segment(&photos);
        assert_eq!(segments.len(), 3);
        let first: Vec<usize> = segments.clone().map(|s| s.index()).collect();
        let second: Vec<usize> = segments.map(|s| s.index()).collect();
        assert_eq!(first, second);
    }
}
