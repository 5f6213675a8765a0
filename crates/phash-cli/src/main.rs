use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use phash_core::logging::{init_logger, log_hash_error};
use phash_core::source::{load_rgba, AnimationSource};
use phash_core::{Algorithm, Config, Fingerprint, Fingerprinter, PixelBuffer};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "phash")]
#[command(about = "Compute perceptual fingerprints of images and video clips")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fingerprint for each file
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Hash algorithm: blockhash, dct, mh or radon
        #[arg(short, long, default_value = "blockhash")]
        algorithm: Algorithm,

        /// Use the quick block hash even when the image does not divide evenly
        #[arg(short, long)]
        quick: bool,

        /// Block hash grid size (hash is bits * bits bits)
        #[arg(short, long)]
        bits: Option<u32>,

        /// Treat files as clips and fingerprint four sampled frames
        #[arg(long)]
        video: bool,

        /// Log intermediate values and dump sampled video frames
        #[arg(long)]
        debug: bool,

        /// Verbosity level
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Compare the fingerprints of two files
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Hash algorithm: blockhash, dct, mh or radon
        #[arg(short, long, default_value = "radon")]
        algorithm: Algorithm,

        /// Treat both files as clips
        #[arg(long)]
        video: bool,

        /// Verbosity level
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "phash.json")]
        path: PathBuf,
    },
}

fn level_for(verbose: u8, debug: bool) -> LevelFilter {
    match (verbose, debug) {
        (_, true) => LevelFilter::Debug,
        (0, _) => LevelFilter::Warn,
        (1, _) => LevelFilter::Info,
        (2, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, anyhow::Error> {
    Ok(match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    })
}

/// Fingerprint one file as a still image or, with `video`, as a clip
fn fingerprint_file(
    fingerprinter: &Fingerprinter,
    path: &Path,
    algorithm: Algorithm,
    video: bool,
) -> phash_core::Result<Fingerprint> {
    if video {
        let mut source = AnimationSource::open(path)?;
        let dump_prefix = fingerprinter.config().debug.then_some(path);
        let clip = fingerprinter.video_fingerprint(&mut source, algorithm, dump_prefix)?;
        return Ok(Fingerprint::Video(clip));
    }

    let img = load_rgba(path)?;
    fingerprinter.fingerprint(&PixelBuffer::from(&img), algorithm)
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash {
            files,
            algorithm,
            quick,
            bits,
            video,
            debug,
            verbose,
            config,
        } => {
            init_logger(level_for(verbose, debug)).map_err(|e| anyhow::anyhow!("{}", e))?;

            let mut config = load_config(config.as_deref())?;
            config.quick |= quick;
            config.debug |= debug;
            if let Some(bits) = bits {
                if video {
                    config.video_bits = bits;
                } else {
                    config.bits = bits;
                }
            }
            let fingerprinter = Fingerprinter::new(config)?;

            info!("Hashing {} files with {}", files.len(), algorithm);

            // collect keeps input order
            let results: Vec<_> = files
                .par_iter()
                .map(|path| {
                    fingerprint_file(&fingerprinter, path, algorithm, video)
                        .and_then(|fp| fp.to_hex())
                })
                .collect();

            let mut failures = 0;
            for (path, result) in files.iter().zip(results) {
                match result {
                    Ok(hex) => println!("{}  {}", hex, path.display()),
                    Err(e) => {
                        log_hash_error(path, &e);
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                eprintln!("{} of {} files could not be hashed", failures, files.len());
                std::process::exit(1);
            }
        }

        Commands::Compare {
            first,
            second,
            algorithm,
            video,
            verbose,
            config,
        } => {
            init_logger(level_for(verbose, false)).map_err(|e| anyhow::anyhow!("{}", e))?;

            let config = load_config(config.as_deref())?;
            let fingerprinter = Fingerprinter::new(config)?;

            let a = fingerprint_file(&fingerprinter, &first, algorithm, video)?;
            let b = fingerprint_file(&fingerprinter, &second, algorithm, video)?;
            let comparison = fingerprinter.compare(&a, &b)?;

            println!("{}  {}", a.to_hex()?, first.display());
            println!("{}  {}", b.to_hex()?, second.display());
            println!("{}", comparison);
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration saved to {}", path.display());
        }
    }

    Ok(())
}
