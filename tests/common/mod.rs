//! Shared test harness for integration tests.
//!
//! Provides [`AlbumHarness`], which owns an input folder of small PNG
//! screenshots, an output folder, and an orchestrator wired to the real
//! renderer and a [`FakeEncoder`] that writes placeholder media units.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use photoreel::render::ImageRenderer;
use photoreel::{Orchestrator, RunOutcome};
use reel_av::{EncodeJob, SegmentEncoder};
use reel_core::config::Config;
use tempfile::TempDir;

/// Encoder that records every job and writes a tiny `.ts` stand-in.
#[derive(Default)]
pub struct FakeEncoder {
    pub calls: Mutex<Vec<usize>>,
    pub fail_on: Mutex<Option<usize>>,
    pub misname_on: Mutex<Option<usize>>,
}

impl FakeEncoder {
    pub fn calls(&self) -> Vec<usize> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_on(&self, segment: Option<usize>) {
        *self.fail_on.lock().unwrap() = segment;
    }

    /// Report a media unit other than the one named by `media_unit_name`.
    pub fn misname_on(&self, segment: Option<usize>) {
        *self.misname_on.lock().unwrap() = segment;
    }
}

#[async_trait]
impl SegmentEncoder for FakeEncoder {
    async fn encode_segment(&self, job: &EncodeJob) -> reel_core::Result<String> {
        self.calls.lock().unwrap().push(job.segment);

        if *self.fail_on.lock().unwrap() == Some(job.segment) {
            return Err(reel_core::Error::encode(job.segment, "injected failure"));
        }

        for frame in 0..job.frame_count {
            let path = job.frames_dir.join(reel_av::frame_file_name(job.segment, frame));
            assert!(path.is_file(), "missing frame {}", path.display());
        }

        let name = if *self.misname_on.lock().unwrap() == Some(job.segment) {
            format!("other-{:05}.ts", job.segment)
        } else {
            self.media_unit_name(job.segment)
        };
        std::fs::write(job.media_dir.join(&name), job.frame_count.to_string())?;
        Ok(name)
    }

    fn media_unit_name(&self, segment: usize) -> String {
        format!("video-{segment:05}_00000.ts")
    }
}

/// Screenshot file name for the `n`-th photo, one second apart.
pub fn shot_name(n: usize) -> String {
    format!(
        "VRChat_1920x1080_2024-01-01_{:02}-{:02}-{:02}.000.png",
        n / 3600,
        n / 60 % 60,
        n % 60
    )
}

/// Write a small solid-color PNG.
pub fn write_png(path: &Path, shade: u8) {
    RgbImage::from_pixel(8, 6, Rgb([shade, shade / 2, 255 - shade]))
        .save(path)
        .unwrap();
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.album.file_prefix = "album".into();
    config.album.block_size = Some(2);
    config.render.width = 32;
    config.render.height = 18;
    config.workers = Some(2);
    config
}

pub struct AlbumHarness {
    pub dir: TempDir,
    pub encoder: Arc<FakeEncoder>,
    pub orchestrator: Orchestrator,
}

fn orchestrator(config: Config, encoder: Arc<FakeEncoder>) -> Orchestrator {
    let renderer = Arc::new(ImageRenderer::new(&config.render));
    Orchestrator::new(config, renderer, encoder).unwrap()
}

impl AlbumHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("input")).unwrap();

        let encoder = Arc::new(FakeEncoder::default());
        let orchestrator = orchestrator(config, encoder.clone());

        Self {
            dir,
            encoder,
            orchestrator,
        }
    }

    /// Keep the folders and the encoder, but build with `config` from now on.
    pub fn reconfigure(&mut self, config: Config) {
        self.orchestrator = orchestrator(config, self.encoder.clone());
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn add_photos(&self, range: std::ops::Range<usize>) {
        for n in range {
            write_png(&self.input().join(shot_name(n)), (n % 256) as u8);
        }
    }

    pub fn add_named(&self, name: &str) {
        write_png(&self.input().join(name), 99);
    }

    /// A screenshot whose bytes are not an image yet.
    pub fn add_unreadable(&self, n: usize) {
        std::fs::write(self.input().join(shot_name(n)), b"still being written").unwrap();
    }

    pub async fn run(&self, force: bool) -> reel_core::Result<RunOutcome> {
        self.orchestrator
            .run(&self.input(), &self.output(), force)
            .await
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output().join("video/album.m3u8")
    }

    pub fn resume_cache_path(&self) -> PathBuf {
        self.output().join("png/album.index")
    }

    pub fn block_path(&self, number: usize) -> PathBuf {
        self.output().join(format!("video/album_{number:05}.m3u8"))
    }

    pub fn freshness_path(&self) -> PathBuf {
        self.output().join("png/album.freshness")
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }
}
