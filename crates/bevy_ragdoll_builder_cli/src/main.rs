use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use bevy::log::{
    error, info,
    tracing_subscriber::{self, EnvFilter},
};
use bevy_ragdoll_builder::prelude::*;
use clap::Parser;
use thiserror::Error;

const DEFAULT_LOG_FILTER: &str = "info";

/// Builds a ragdoll rig from a skeleton file and prints it as RON.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Posed skeleton, usually a `*.skel.ron` file
    #[arg(short, long)]
    skeleton: PathBuf,
    /// Ragdoll configuration. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the rig. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Ragdoll(#[from] RagdollError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Log directives from `RUST_LOG`, falling back to `info` when unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let skeleton = SkeletonSerial::from_ron(&read(&cli.skeleton)?)?.to_value()?;
    info!(
        "Loaded skeleton with {} bones from {:?}",
        skeleton.bone_count(),
        cli.skeleton
    );

    let config = match &cli.config {
        Some(path) => RagdollConfig::from_ron(&read(path)?)?,
        None => RagdollConfig::default(),
    };

    let rig = build_rig(&skeleton, &config)?;
    let serialized = rig.to_ron()?;

    match &cli.output {
        Some(path) => {
            fs::write(path, serialized).map_err(LoaderError::from)?;
            info!("Wrote {} segments to {path:?}", rig.segment_count());
        }
        None => println!("{serialized}"),
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, LoaderError> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use bevy::log::tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn log_filter_follows_rust_log() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("ragdoll=loudest")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn writes_the_rig_to_the_output_file() {
        let output = std::env::temp_dir().join("bevy_ragdoll_builder_cli_output.rig.ron");
        let cli = Cli::try_parse_from([
            "bevy_ragdoll_builder_cli",
            "--skeleton",
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/skeletons/humanoid.skel.ron"),
            "--config",
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/ragdolls/heavy.ragdoll.ron"),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        run(&cli).unwrap();

        let rig = RagdollRig::from_ron(&fs::read_to_string(&output).unwrap()).unwrap();
        let _ = fs::remove_file(&output);
        assert!((rig.total_mass() - 90.).abs() < 1e-2);
        assert_eq!(rig.segment_count(), 11);
    }
}
