use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use clap::{ArgAction, Parser};

#[derive(Clone, Debug, Parser)]
#[command(name = "osbx", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// Name of the project to export
    #[arg(value_parser = parse_project)]
    pub project: String,

    /// Archive previously exported from the management console
    #[arg(short, long, value_name = "FILE")]
    pub archive: PathBuf,

    /// Existing directory to export into [default: ./OSBExport_<PROJECT>_<timestamp>]
    #[arg(short = 'd', long, value_name = "DIR", value_parser = parse_existing_dir)]
    pub export_dir: Option<PathBuf>,

    /// Also keep the raw archive as <PROJECT>.jar in the export directory
    #[arg(short, long)]
    pub keep_archive: bool,

    /// Configuration file [default: ./osbx.toml when present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More output, repeat for even more
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_project(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("project name must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn parse_existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.is_dir() {
        return Err(format!("export directory '{s}' does not exist"));
    }
    Ok(path)
}

/// `<base>/OSBExport_<project>_<yyyyMMddHHmmssSSS>`.
pub fn default_export_dir<Tz>(base: &Path, project: &str, now: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    base.join(format!(
        "OSBExport_{project}_{}",
        now.format("%Y%m%d%H%M%S%3f")
    ))
}
