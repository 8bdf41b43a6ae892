//! Pipeline - one export run from archive bytes to the final tree.
//!
//! Stages run one after the other over the whole file set. Only a failure to
//! set the run up or to extract the archive aborts it; everything later is
//! collected per file in the [`PipelineReport`].

use std::path::{Path, PathBuf};

use osbx_archive::ExtractionReport;
use osbx_fs::{RelocationReport, Staging};
use tracing::{info, info_span};

use crate::classify::{Classifier, ProcessingReport};
use crate::envelope::{EnvelopeLocator, UnwrapOutcome, Unwrapper};
use crate::error::PipelineError;
use crate::registry::ExtensionRegistry;

/// Inputs of one export run.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub project_name: String,
    /// Root of the final tree.
    pub export_dir: PathBuf,
    /// Raw archive as returned by the export provider.
    pub archive: Vec<u8>,
}

impl ExportJob {
    pub fn new(project_name: impl Into<String>, export_dir: impl Into<PathBuf>, archive: Vec<u8>) -> Self {
        Self {
            project_name: project_name.into(),
            export_dir: export_dir.into(),
            archive,
        }
    }

    /// Where the raw archive is kept when requested.
    pub fn archive_path(&self) -> PathBuf {
        self.export_dir.join(format!("{}.jar", self.project_name))
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub archive_path: Option<PathBuf>,
    pub extraction: ExtractionReport,
    pub processing: ProcessingReport,
    /// Outcome for every renamed file, in classification order.
    pub unwrapped: Vec<(PathBuf, UnwrapOutcome)>,
    pub relocation: RelocationReport,
}

impl PipelineReport {
    pub fn unwrapped_count(&self) -> usize {
        self.unwrapped.iter().filter(|(_, o)| o.is_unwrapped()).count()
    }

    /// Non-fatal problems over all stages.
    pub fn warning_count(&self) -> usize {
        self.processing.warning_count()
            + self.unwrapped.iter().filter(|(_, o)| o.is_warning()).count()
            + self.relocation.warnings.len()
            + self.relocation.errors.len()
    }
}

pub struct Pipeline {
    registry: ExtensionRegistry,
    unwrapper: Unwrapper,
    staging_parent: Option<PathBuf>,
    keep_archive: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ExtensionRegistry::default(), EnvelopeLocator::default())
    }
}

impl Pipeline {
    pub fn new(registry: ExtensionRegistry, locator: EnvelopeLocator) -> Self {
        Self {
            registry,
            unwrapper: Unwrapper::new(locator),
            staging_parent: None,
            keep_archive: false,
        }
    }

    /// Directory in which the per-run staging tree is created. Defaults to
    /// the parent of the export directory.
    pub fn staging_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(parent.into());
        self
    }

    /// Also write the raw archive to [`ExportJob::archive_path`].
    pub fn keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }

    pub fn run(&self, job: &ExportJob) -> Result<PipelineReport, PipelineError> {
        let span = info_span!("export", project = %job.project_name);
        let _guard = span.enter();

        let archive_path = if self.keep_archive {
            Some(self.write_archive(job)?)
        } else {
            None
        };

        let staging_parent = self
            .staging_parent
            .clone()
            .unwrap_or_else(|| default_staging_parent(&job.export_dir));
        let staging = Staging::new_in(&staging_parent).map_err(PipelineError::Staging)?;

        // Dropping `staging` on the error path removes the partial tree.
        let extraction = osbx_archive::extract_bytes(&job.archive, staging.path())?;

        let processing = Classifier::new(&self.registry).process_tree(staging.path());

        let unwrapped: Vec<(PathBuf, UnwrapOutcome)> = processing
            .renamed()
            .map(|path| (path.to_path_buf(), self.unwrapper.unwrap_file(path)))
            .collect();

        let relocation = staging.relocate_into(&job.export_dir);

        let report = PipelineReport {
            archive_path,
            extraction,
            processing,
            unwrapped,
            relocation,
        };
        info!(
            renamed = report.processing.renamed_count(),
            deleted = report.processing.deleted_count(),
            skipped = report.processing.skipped_count(),
            unwrapped = report.unwrapped_count(),
            moved = report.relocation.moved.len(),
            warnings = report.warning_count(),
            destination = %job.export_dir.display(),
            "export normalized"
        );
        Ok(report)
    }

    fn write_archive(&self, job: &ExportJob) -> Result<PathBuf, PipelineError> {
        let path = job.archive_path();
        std::fs::create_dir_all(&job.export_dir).map_err(|source| {
            PipelineError::ArchiveWrite(osbx_fs::Error::Write {
                path: job.export_dir.clone(),
                source,
            })
        })?;
        osbx_fs::atomic_write(&path, &job.archive).map_err(PipelineError::ArchiveWrite)?;

        info!(path = %path.display(), bytes = job.archive.len(), "raw archive written");
        Ok(path)
    }
}

fn default_staging_parent(export_dir: &Path) -> PathBuf {
    match export_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
