//! `dsp-info`: inspect capability detection and kernel selection.
//!
//! Provides subcommands:
//! - features: detected (or forced) capability snapshot
//! - entries: registered kernel variants in priority order
//! - selected: Entry each operation dispatches to

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use dsp_core::KernelConfig;
use dsp_cpu::{detect_features, CpuFeatures, SimdLevel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vecmath::{OpId, Registry};

#[derive(Parser)]
#[command(name = "dsp-info")]
#[command(about = "CPU capability and kernel selection report", long_about = None)]
#[command(version)]
struct Cli {
    /// Kernel selection config (TOML). Defaults to DSP_* environment variables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable every SIMD tier before dispatch
    #[arg(long, global = true)]
    force_generic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the capability snapshot dispatch uses
    Features,

    /// List registered kernel variants in priority order
    Entries,

    /// Show the kernel variant selected for each operation
    Selected,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.force_generic)?;
    init_logging(&config.log_level);

    let features = vecmath::apply_config(&config)?;

    match cli.command {
        Commands::Features => show_features(&features),
        Commands::Entries => show_entries(&features),
        Commands::Selected => show_selected()?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>, force_generic: bool) -> anyhow::Result<KernelConfig> {
    let mut config = match path {
        Some(path) => KernelConfig::from_file(path)?,
        None => KernelConfig::from_env()?,
    };
    if force_generic {
        config.force_generic = true;
    }
    config.validate()?;
    Ok(config)
}

/// Console logging; `RUST_LOG` wins over the configured level.
fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn flag(on: bool) -> colored::ColoredString {
    if on {
        "yes".green()
    } else {
        "no".dimmed()
    }
}

fn show_features(features: &CpuFeatures) {
    println!("{}", "CPU Features".bold().cyan());
    println!("  {} {}", "Arch:".cyan(), features.arch);
    for level in SimdLevel::ALL.into_iter().skip(1) {
        if level.arch() == Some(features.arch) {
            println!("  {:<9} {}", format!("{level}:"), flag(features.flag(level)));
        }
    }
    if features.arch == dsp_cpu::Arch::X86_64 {
        println!("  {:<9} {}", "FMA:", flag(features.has_fma));
    }
    if features.force_generic {
        println!("  {}", "forced generic".yellow());
    }
    if dsp_cpu::forced_features().is_some() {
        println!("  {}", "(override active)".yellow());
    }
    println!(
        "  {} {}",
        "Best tier:".cyan(),
        features.best_level().to_string().bold()
    );
}

fn show_entries(features: &CpuFeatures) {
    let registry = Registry::global();
    let selected = registry.lookup(features).map(|e| e.name);

    println!("{}", "Registered kernels".bold().cyan());
    println!(
        "  {:<10} {:<8} {:>8} {:>5}  {}",
        "NAME", "TIER", "PRIORITY", "OPS", "USABLE"
    );
    for entry in registry.entries_by_priority() {
        let marker = if Some(entry.name) == selected {
            "✓".green()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<10} {:<8} {:>8} {:>2}/{:<2}  {}",
            marker,
            entry.name,
            entry.level.name(),
            entry.priority,
            entry.ops.implemented().count(),
            OpId::ALL.len(),
            flag(features.supports(entry.level)),
        );
    }
}

fn show_selected() -> anyhow::Result<()> {
    println!("{}", "Selected kernels".bold().cyan());
    for op in OpId::ALL {
        match vecmath::selected_kernel(op) {
            Ok(name) => println!("  {:<22} {}", op.name(), name.green()),
            Err(e) => {
                println!("  {:<22} {}", op.name(), e.to_string().red());
                anyhow::bail!("kernel resolution failed for {op}");
            }
        }
    }
    tracing::debug!(features = %detect_features(), "dispatch snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from(["dsp-info", "entries", "--force-generic"]).unwrap();
        assert!(cli.force_generic);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Entries));

        let cli = Cli::try_parse_from(["dsp-info", "-c", "k.toml", "selected"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("k.toml")));
        assert!(matches!(cli.command, Commands::Selected));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["dsp-info"]).is_err());
    }

    #[test]
    fn test_load_config_file_with_flag() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("kernels.toml");
        std::fs::write(&path, "max_level = \"SSE2\"\nlog_level = \"debug\"\n")?;

        let config = load_config(Some(&path), true)?;
        assert!(config.force_generic);
        assert_eq!(config.max_level.as_deref(), Some("SSE2"));
        assert_eq!(config.log_level, "debug");
        Ok(())
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        assert!(load_config(Some(Path::new("/nonexistent/kernels.toml")), false).is_err());
    }
}
