//! Incremental album build.
//!
//! A run walks a small state machine:
//!
//! ```text
//! CheckUnchanged ─▶ Done
//!       │
//!       ▼
//! Resegment ─▶ DetectChanges ─▶ RebuildFrom(i) ─▶ WriteManifest ─▶ WriteResumeCache ─▶ Done
//! ```
//!
//! Any failure while rebuilding aborts the run before the manifest, block
//! playlists, resume cache or freshness token are touched, so the next run
//! starts from the same ledger. The outputs are then staged as a whole and
//! only committed once every one of them has been written.
//!
//! A segment with a photo that could not be decoded is still encoded and
//! listed, but its index record (and every later one) is held back from the
//! ledger, so the next run rebuilds it.

mod layout;
mod work;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reel_av::SegmentEncoder;
use reel_core::{Config, Error, Result};
use reel_media::hls::{self, IndexRecord};
use reel_media::{find_resume_point, ManifestError, Photo, ResumePoint, Segmenter};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::discovery::discover_photos;
use crate::freshness::FreshnessToken;
use crate::render::Renderer;

pub use layout::{Layout, StagedWrites};
use work::{BuiltSegment, SegmentContext};

/// Where the prior index records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorSource {
    ResumeCache,
    Manifest,
    None,
}

/// Summary of a run (or of a plan, for a dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The freshness token matched; nothing else was inspected.
    pub unchanged: bool,
    pub photo_count: usize,
    pub segment_count: usize,
    pub resume: ResumePoint,
    pub prior: PriorSource,
    /// Segments rendered and encoded (or that would be, for a plan).
    pub rebuilt: usize,
    /// Photos left out of their segment because they could not be decoded.
    pub skipped: usize,
}

impl RunOutcome {
    fn unchanged() -> Self {
        Self {
            unchanged: true,
            photo_count: 0,
            segment_count: 0,
            resume: ResumePoint::UpToDate,
            prior: PriorSource::None,
            rebuilt: 0,
            skipped: 0,
        }
    }
}

/// State gathered before any output is written.
struct Prepared {
    layout: Layout,
    token: FreshnessToken,
    photos: Vec<Photo>,
    segmenter: Segmenter,
    resume: ResumePoint,
    prior: PriorSource,
}

impl Prepared {
    fn outcome(&self, rebuilt: usize, skipped: usize) -> RunOutcome {
        RunOutcome {
            unchanged: false,
            photo_count: self.photos.len(),
            segment_count: self.segmenter.segment_count(self.photos.len()),
            resume: self.resume,
            prior: self.prior,
            rebuilt,
            skipped,
        }
    }

    fn stale_count(&self) -> usize {
        let count = self.segmenter.segment_count(self.photos.len());
        count - self.resume.index(count)
    }
}

/// Result of the rebuild stage.
#[derive(Debug, Default)]
struct Rebuild {
    segments: usize,
    skipped: usize,
    /// Lowest segment with a photo left out.
    first_incomplete: Option<usize>,
}

impl Rebuild {
    fn record(&mut self, built: BuiltSegment) {
        self.segments += 1;
        if built.skipped > 0 {
            self.skipped += built.skipped;
            self.first_incomplete = Some(
                self.first_incomplete
                    .map_or(built.segment, |first| first.min(built.segment)),
            );
        }
    }
}

/// Drives discovery, change detection, rebuilding and manifest writing.
pub struct Orchestrator {
    config: Arc<Config>,
    renderer: Arc<dyn Renderer>,
    encoder: Arc<dyn SegmentEncoder>,
    workers: usize,
}

impl Orchestrator {
    /// Validate the configuration and build an orchestrator.
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        encoder: Arc<dyn SegmentEncoder>,
    ) -> Result<Self> {
        config.validate()?;
        for warning in config.warnings() {
            warn!("{warning}");
        }

        let workers = config.workers.unwrap_or_else(num_cpus::get).max(1);

        Ok(Self {
            config: Arc::new(config),
            renderer,
            encoder,
            workers,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Report what [`run`](Self::run) would do without rendering or writing
    /// anything.
    pub async fn plan(&self, input: &Path, output: &Path, force: bool) -> Result<RunOutcome> {
        match self.prepare(input, output, force)? {
            None => Ok(RunOutcome::unchanged()),
            Some(prepared) => Ok(prepared.outcome(prepared.stale_count(), 0)),
        }
    }

    /// Bring the album in `output` up to date with the photos in `input`.
    ///
    /// `force` skips the freshness fast path; change detection still limits
    /// the rebuild to stale segments.
    pub async fn run(&self, input: &Path, output: &Path, force: bool) -> Result<RunOutcome> {
        let Some(prepared) = self.prepare(input, output, force)? else {
            info!("album unchanged since last run");
            return Ok(RunOutcome::unchanged());
        };

        let segment_count = prepared.segmenter.segment_count(prepared.photos.len());
        let start = prepared.resume.index(segment_count);

        info!(
            photos = prepared.photos.len(),
            segments = segment_count,
            resume = start,
            stale = segment_count - start,
            "change detection complete"
        );

        prepared.layout.create_dirs()?;

        let rebuild = self.rebuild(&prepared, start).await?;
        self.write_outputs(&prepared, rebuild.first_incomplete)?;

        Ok(prepared.outcome(rebuild.segments, rebuild.skipped))
    }

    /// `CheckUnchanged`, `Resegment` and `DetectChanges`. `None` means the
    /// freshness token matched.
    fn prepare(&self, input: &Path, output: &Path, force: bool) -> Result<Option<Prepared>> {
        let album = &self.config.album;
        let layout = Layout::new(output, album.file_prefix.clone());

        let token = FreshnessToken::current(input, &self.config)?;
        if !force
            && layout.manifest_path().is_file()
            && FreshnessToken::load(&layout.freshness_path()).as_ref() == Some(&token)
        {
            debug!(token = %token, "freshness token unchanged");
            return Ok(None);
        }

        let photos = discover_photos(input, album)?;
        let segmenter = Segmenter::new(album.tile_capacity)
            .ok_or_else(|| Error::Validation("album.tile_capacity must be > 0".into()))?;

        let (prior_records, prior) = load_prior(&layout);
        let resume = find_resume_point(segmenter.segment(&photos), &prior_records);

        Ok(Some(Prepared {
            layout,
            token,
            photos,
            segmenter,
            resume,
            prior,
        }))
    }

    /// `RebuildFrom(start)`: render and encode every segment from `start`
    /// on, at most `workers` at a time. The first failure aborts the rest.
    async fn rebuild(&self, prepared: &Prepared, start: usize) -> Result<Rebuild> {
        let ctx = Arc::new(SegmentContext {
            renderer: Arc::clone(&self.renderer),
            encoder: Arc::clone(&self.encoder),
            frames_dir: prepared.layout.frames_dir(),
            media_dir: prepared.layout.media_dir(),
            user_delimiter: self.config.metadata.user_delimiter.clone(),
        });

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<Result<BuiltSegment>> = JoinSet::new();
        let mut rebuild = Rebuild::default();

        for segment in prepared.segmenter.segment(&prepared.photos).skip(start) {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(format!("worker pool closed: {e}")))?;

            let ctx = Arc::clone(&ctx);
            let index = segment.index();
            let photos = segment.photos().to_vec();
            tasks.spawn(async move {
                let _permit = permit;
                ctx.process(index, photos).await
            });

            // Surface failures early instead of after queueing everything.
            while let Some(joined) = tasks.try_join_next() {
                rebuild.record(finish_task(joined)?);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            // Returning drops the JoinSet, which aborts the remaining tasks.
            rebuild.record(finish_task(joined)?);
        }

        Ok(rebuild)
    }

    /// `WriteManifest` and `WriteResumeCache`, then the freshness token.
    ///
    /// Everything is staged first; nothing replaces the previous outputs
    /// unless every file could be written. Block playlists are committed
    /// before the ledger files, the token last.
    fn write_outputs(&self, prepared: &Prepared, first_incomplete: Option<usize>) -> Result<()> {
        let album = &self.config.album;
        let layout = &prepared.layout;

        let records: Vec<IndexRecord> = prepared
            .segmenter
            .segment(&prepared.photos)
            .map(|s| IndexRecord::from(&s))
            .collect();
        let entry_name = |i: usize| self.encoder.media_unit_name(i);

        let mut manifest = hls::build_manifest(&records, entry_name);
        if let Some(first) = first_incomplete {
            warn!(segment = first, "holding back index records from an incomplete segment");
            manifest.index.truncate(first);
        }

        let mut staged = StagedWrites::new();

        if let Some(block_size) = album.block_size {
            let blocks =
                hls::build_blocks(records.len(), block_size, entry_name, &album.placeholder_media);
            for block in &blocks {
                let path = layout.block_path(&block.file_name(layout.prefix()));
                staged.write(path, block.render().as_bytes())?;
            }
            stage_stale_blocks(layout, blocks.len(), &mut staged)?;
            debug!(blocks = blocks.len(), "block playlists staged");
        }

        staged.write(layout.manifest_path(), manifest.render().as_bytes())?;
        staged.write(
            layout.resume_cache_path(),
            hls::render_resume_cache(&manifest.index).as_bytes(),
        )?;

        // An incomplete build must not satisfy the fast path next time.
        let token = match first_incomplete {
            None => prepared.token.as_str(),
            Some(_) => "incomplete",
        };
        staged.write(layout.freshness_path(), token.as_bytes())?;

        debug!(files = staged.len(), "committing outputs");
        staged.commit()?;

        info!(
            segments = records.len(),
            recorded = manifest.index.len(),
            manifest = %layout.manifest_path().display(),
            "manifest written"
        );
        Ok(())
    }
}

fn finish_task(
    joined: std::result::Result<Result<BuiltSegment>, tokio::task::JoinError>,
) -> Result<BuiltSegment> {
    joined.map_err(|e| Error::Internal(format!("segment task failed: {e}")))?
}

/// Prior records from the resume cache, else the manifest, else nothing.
fn load_prior(layout: &Layout) -> (Vec<IndexRecord>, PriorSource) {
    match hls::read_resume_cache(&layout.resume_cache_path()) {
        Ok(records) => {
            debug!(records = records.len(), "prior records from resume cache");
            return (records, PriorSource::ResumeCache);
        }
        Err(ManifestError::Missing(_)) => debug!("no resume cache"),
        Err(e) => warn!(error = %e, "resume cache unusable, falling back to manifest"),
    }

    match hls::read_manifest_records(&layout.manifest_path()) {
        Ok(records) => {
            debug!(records = records.len(), "prior records from manifest");
            (records, PriorSource::Manifest)
        }
        Err(ManifestError::Missing(_)) => {
            debug!("no prior manifest, building from scratch");
            (Vec::new(), PriorSource::None)
        }
        Err(e) => {
            warn!(error = %e, "prior manifest unusable, rebuilding everything");
            (Vec::new(), PriorSource::None)
        }
    }
}

/// Stage the removal of block playlists past the current block count after
/// the album shrank.
fn stage_stale_blocks(layout: &Layout, from: usize, staged: &mut StagedWrites) -> Result<()> {
    let mut number = from;
    loop {
        let path: PathBuf = layout.block_path(&format!("{}_{number:05}.m3u8", layout.prefix()));
        if !path.exists() {
            return Ok(());
        }
        staged.remove(path)?;
        number += 1;
    }
}
