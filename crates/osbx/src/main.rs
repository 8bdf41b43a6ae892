use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use osbx_normalize::{ExportJob, Pipeline};
use tracing::{info, warn};

use crate::cli::App;
use crate::config::Config;
use crate::provider::{ArchiveProvider, ExportRequest, FileArchiveProvider};

mod cli;
mod config;
mod logging;
mod provider;

fn main() -> ExitCode {
    // Argument errors exit with 2 from here.
    let app = App::parse();

    match run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: App) -> anyhow::Result<()> {
    let config = Config::load(app.config.as_deref())?;
    logging::init(app.verbose, app.quiet, config.log.level.as_deref());

    let export_dir = match app.export_dir {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir().context("failed to resolve working directory")?;
            cli::default_export_dir(&cwd, &app.project, Local::now())
        }
    };

    let provider = FileArchiveProvider::new(&app.archive);
    let archive = provider
        .export_archive(&app.project, &ExportRequest::default())
        .with_context(|| format!("failed to export project '{}'", app.project))?;

    let mut pipeline = Pipeline::new(config.registry(), config.locator())
        .keep_archive(app.keep_archive || config.export.keep_archive);
    if let Some(parent) = config.export.staging_parent {
        pipeline = pipeline.staging_parent(parent);
    }

    let job = ExportJob::new(app.project, export_dir, archive);
    let report = pipeline
        .run(&job)
        .with_context(|| format!("export of '{}' failed", job.project_name))?;

    let warnings = report.warning_count();
    if warnings > 0 {
        warn!(warnings, "export finished with warnings");
    }
    info!(destination = %job.export_dir.display(), "export complete");
    Ok(())
}
