mod cli;

use photoreel::{config, render::ImageRenderer, Orchestrator, RunOutcome};
use reel_av::{FfmpegEncoder, ToolRegistry};
use reel_media::hls;
use reel_media::png::read_metadata_file;
use reel_media::{PhotoMetadata, ResumePoint};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "photoreel=debug,reel_media=debug,reel_av=trace".to_string()
        } else {
            "photoreel=info,reel_media=info,reel_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dispatch(cli) {
        eprintln!("Error: {err:#}");
        let code = err
            .chain()
            .find_map(|e| e.downcast_ref::<reel_core::Error>())
            .map(reel_core::Error::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            input,
            output,
            prefix,
            freshness_marker,
            workers,
            force,
            dry_run,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;

            // CLI flags override file values
            if let Some(prefix) = prefix {
                config.album.file_prefix = prefix;
            }
            if freshness_marker.is_some() {
                config.album.freshness_marker = freshness_marker;
            }
            if workers.is_some() {
                config.workers = workers;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_album(config, &input, &output, force, dry_run))
        }
        Commands::Meta { file, json } => print_metadata(&file, cli.config.as_deref(), json),
        Commands::Manifest { file, json } => print_manifest(&file, json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

async fn run_album(
    config: config::Config,
    input: &Path,
    output: &Path,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    let renderer = Arc::new(ImageRenderer::new(&config.render));

    let tools = ToolRegistry::discover(&config.tools);
    let encoder = match FfmpegEncoder::from_registry(&tools, config.encode.clone()) {
        Ok(encoder) => encoder,
        // A plan never encodes.
        Err(_) if dry_run => FfmpegEncoder::new(PathBuf::from("ffmpeg"), config.encode.clone()),
        Err(e) => return Err(e.into()),
    };

    let orchestrator = Orchestrator::new(config, renderer, Arc::new(encoder))?;

    tracing::info!(
        "Processing album {:?} -> {:?} ({} workers)",
        input,
        output,
        orchestrator.workers()
    );

    if dry_run {
        let outcome = orchestrator.plan(input, output, force).await?;
        println!("[DRY RUN]");
        print_outcome(&outcome, "Would rebuild");
        return Ok(());
    }

    let outcome = orchestrator
        .run(input, output, force)
        .await
        .context("Album build failed; previous manifest left untouched")?;
    print_outcome(&outcome, "Rebuilt");
    Ok(())
}

fn print_outcome(outcome: &RunOutcome, verb: &str) {
    if outcome.unchanged {
        println!("Album unchanged since last run. Use --force to check anyway.");
        return;
    }

    println!("Photos: {}", outcome.photo_count);
    println!("Segments: {}", outcome.segment_count);
    println!("Prior records: {:?}", outcome.prior);
    match outcome.resume {
        ResumePoint::UpToDate => println!("All segments up to date"),
        ResumePoint::RebuildFrom(i) => println!("First stale segment: {}", i),
    }
    println!("{} segments: {}", verb, outcome.rebuilt);
    if outcome.skipped > 0 {
        println!(
            "Undecodable photos left out: {} (their segments are rebuilt next run)",
            outcome.skipped
        );
    }
}

fn print_metadata(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let record = read_metadata_file(file, &config.metadata.user_delimiter)
        .with_context(|| format!("Failed to read metadata from {:?}", file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let Some(meta) = PhotoMetadata::from_record(record) else {
        println!("No metadata in {}", file.display());
        return Ok(());
    };

    println!("File: {}", file.display());
    if let Some(date) = meta.date() {
        match meta.readable_date() {
            Some(readable) => println!("Date: {} ({})", readable, date),
            None => println!("Date: {}", date),
        }
    }
    if let Some(photographer) = meta.photographer() {
        println!("Photographer: {}", photographer);
    }
    if let Some(world) = meta.world() {
        println!("World: {}", world);
    }

    println!("\nUsers: {}", meta.users().len());
    for (name, handle) in meta.users() {
        match handle {
            Some(handle) => println!("  {} ({})", name, handle),
            None => println!("  {}", name),
        }
    }

    Ok(())
}

fn print_manifest(file: &Path, json: bool) -> Result<()> {
    let is_playlist = file.extension().is_some_and(|ext| ext == "m3u8");
    let records = if is_playlist {
        hls::read_manifest_records(file)
    } else {
        hls::read_resume_cache(file)
    }
    .with_context(|| format!("Failed to read index records from {:?}", file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Index records: {}", records.len());
    for record in &records {
        println!("  [{}] {} .. {}", record.index, record.start, record.end);
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to encode albums.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Tile capacity: {}", config.album.tile_capacity);
    match config.album.block_size {
        Some(size) => println!("  Block size: {}", size),
        None => println!("  Block size: disabled"),
    }
    println!("  File prefix: {}", config.album.file_prefix);
    println!(
        "  Fingerprint: offset {}, length {}",
        config.album.fingerprint.offset, config.album.fingerprint.length
    );
    println!(
        "  Output: {}x{} @ {} fps",
        config.render.width, config.render.height, config.encode.framerate
    );
    match config.workers {
        Some(n) => println!("  Workers: {}", n),
        None => println!("  Workers: {} (CPUs)", num_cpus::get()),
    }

    Ok(())
}
