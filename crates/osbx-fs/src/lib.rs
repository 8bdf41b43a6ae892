//! Filesystem primitives shared by the export pipeline.
//!
//! - `walk.rs` - Lazy, restartable enumeration of regular files
//! - `primitives/` - Atomic write and file move
//! - `workspace.rs` - Per-run staging directory
//! - `relocate.rs` - Merge of a staging tree into the final tree

mod error;
pub mod primitives;
pub mod relocate;
pub mod walk;
mod workspace;

pub use error::{Error, Result};
pub use primitives::{atomic_write, move_file};
#[cfg(unix)]
pub use primitives::NEW_FILE_MODE;
pub use relocate::{RelocationError, RelocationReport, RelocationWarning, relocate, relocate_paths};
pub use walk::{FileWalk, Files};
pub use workspace::Staging;
