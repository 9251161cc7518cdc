//! scorehud - sidebar scoreboard HUD for block-game servers
//!
//! Headless harness: drives the HUD against a scripted fake server and
//! writes a transcript of everything it would have sent to clients.

mod config;
mod headless;
mod script;

use anyhow::Result;
use config::DEFAULT_CONFIG_PATH;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

const DEFAULT_TICKS: u64 = 200;

fn main() -> Result<()> {
    // INFO by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting scorehud v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print_usage();
        return Ok(());
    }

    let summary = headless::run(HeadlessConfig {
        config_path: cli.config,
        script: cli.script,
        ticks: cli.ticks,
        transcript: cli.transcript,
        metrics: cli.metrics,
    })?;
    println!(
        "{} ticks, {} refreshes, {} pushes, {} frames, {} active displays",
        summary.ticks, summary.firings, summary.metrics.pushes, summary.frames, summary.active
    );
    Ok(())
}

#[derive(Debug)]
struct CliOptions {
    help: bool,
    config: PathBuf,
    script: Option<PathBuf>,
    ticks: u64,
    transcript: Option<PathBuf>,
    metrics: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            help: false,
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            script: None,
            ticks: DEFAULT_TICKS,
            transcript: None,
            metrics: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "--ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.ticks = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--ticks requires an integer");
                    }
                }
                "--transcript" => {
                    if let Some(path) = args.next() {
                        opts.transcript = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--transcript requires a file path");
                    }
                }
                "--metrics" => {
                    if let Some(path) = args.next() {
                        opts.metrics = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--metrics requires a file path");
                    }
                }
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }

        opts
    }
}

fn print_usage() {
    println!("usage: scorehud [--config PATH] [--script PATH] [--ticks N]");
    println!("                [--transcript PATH] [--metrics PATH]");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn defaults_without_flags() {
        let opts = parse(&[]);
        assert_eq!(opts.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(opts.ticks, DEFAULT_TICKS);
        assert!(opts.transcript.is_none());
    }

    #[test]
    fn flags_are_parsed() {
        let opts = parse(&[
            "--config",
            "hud.toml",
            "--ticks",
            "40",
            "--transcript",
            "out/t.jsonl",
            "--metrics",
            "out/m.json",
        ]);
        assert_eq!(opts.config, PathBuf::from("hud.toml"));
        assert_eq!(opts.ticks, 40);
        assert_eq!(opts.transcript, Some(PathBuf::from("out/t.jsonl")));
        assert_eq!(opts.metrics, Some(PathBuf::from("out/m.json")));
    }

    #[test]
    fn bad_tick_count_keeps_default() {
        assert_eq!(parse(&["--ticks", "lots"]).ticks, DEFAULT_TICKS);
    }
}
