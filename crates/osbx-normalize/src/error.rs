/// Failures that abort an export run. Everything else is reported per file.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to keep the raw archive: {0}")]
    ArchiveWrite(#[source] osbx_fs::Error),

    #[error("failed to prepare staging directory: {0}")]
    Staging(#[source] osbx_fs::Error),

    #[error("extraction failed: {0}")]
    Extraction(#[from] osbx_archive::Error),
}
