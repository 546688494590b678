//! The `obfuscate` binary.
//!
//! Reads an input text, loads or regenerates a target n-gram profile, and
//! runs the obfuscation search, overwriting the output file with the best
//! rewrite found so far on every improvement.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use veil_core::{GenerateFlags, NgramProfile, Seed};
use veil_obfuscate::{Obfuscator, ObfuscatorConfig};

/// Rewrite a text until its n-gram profile diverges from its author's.
#[derive(Parser)]
#[command(name = "obfuscate")]
#[command(about = "veil: author-style text obfuscation")]
struct Cli {
    /// Input text file to be obfuscated.
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output file for the obfuscated text.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Target n-gram profile (regenerated if --profile-source-files is set).
    #[arg(short, long, value_name = "FILE")]
    profile: PathBuf,

    /// Source files to generate a target profile from.
    #[arg(short = 'f', long, value_name = "FILE", num_args = 1..)]
    profile_source_files: Option<Vec<PathBuf>>,

    /// Strip POS tags from the input text.
    #[arg(short, long)]
    strip_pos: bool,

    /// Strip POS tags from the profile source files.
    #[arg(long, requires = "profile_source_files")]
    profile_strip_pos: bool,

    /// Phrase-frequency service home directory.
    #[arg(short, long, value_name = "DIR")]
    netspeak: PathBuf,

    /// Hex seed for a reproducible run.
    #[arg(long, value_name = "HEX")]
    seed: Option<String>,
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input = fs::read_to_string(&cli.input)
        .map_err(|error| format!("could not read input file '{}': {error}", cli.input.display()))?;

    let target = if let Some(sources) = &cli.profile_source_files {
        info!("generating target profile from {} file(s)", sources.len());
        let flags = GenerateFlags {
            skip_normalization: false,
            strip_pos_annotations: cli.profile_strip_pos,
        };
        let profile = NgramProfile::generate_from_files(sources, flags)?;

        info!("saving target profile to '{}'", cli.profile.display());
        profile.save(&cli.profile)?;
        profile
    } else {
        info!("loading target profile from '{}'", cli.profile.display());
        NgramProfile::load(&cli.profile)?
    };

    debug!(
        "phrase service home '{}' noted; no backend is linked into this build",
        cli.netspeak.display()
    );

    let seed = match &cli.seed {
        Some(hex) => Seed::from_hex(hex)?,
        None => Seed::generate(),
    };
    info!("run seed: {}", seed.to_hex());

    let config = ObfuscatorConfig {
        seed,
        strip_pos_annotations: cli.strip_pos,
        ..ObfuscatorConfig::default()
    };

    let output_path = cli.output.clone();
    let obfuscator = Obfuscator::new(config);
    let outcome = obfuscator.obfuscate(&input, Arc::new(target), |progress| {
        if progress.improved {
            // Truncate and rewrite so the file always holds one coherent state.
            if let Err(error) = fs::write(&output_path, &progress.text) {
                warn!(
                    "could not stream rewrite to '{}': {error}",
                    output_path.display()
                );
            }
        }

        info!(
            "depth {} | jsd {:.5} | distance {:.5} of {:.5} | open {} | closed {} | {} ms",
            progress.depth,
            progress.jsd,
            progress.js_distance,
            progress.goal_js_distance,
            progress.open,
            progress.closed,
            progress.runtime_in_millis,
        );
    })?;

    fs::write(&cli.output, &outcome.best_text).map_err(|error| {
        format!(
            "could not write output file '{}': {error}",
            cli.output.display()
        )
    })?;

    if let Some(message) = outcome.error_message {
        return Err(format!("search failed: {message}").into());
    }

    if outcome.has_goal_state {
        info!(
            "goal reached after {} goal checks: distance {:.5} >= {:.5}",
            outcome.num_goal_checks, outcome.js_distance, outcome.goal_js_distance
        );
    } else if outcome.aborted_by_memguard {
        warn!("search aborted by the memory guard; best rewrite streamed so far is kept");
    } else {
        info!(
            "search ended without reaching the goal: distance {:.5} of {:.5}",
            outcome.js_distance, outcome.goal_js_distance
        );
    }

    Ok(())
}
