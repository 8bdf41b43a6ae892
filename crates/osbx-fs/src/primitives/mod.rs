pub mod atomic_write;
pub mod move_file;

pub use atomic_write::atomic_write;
#[cfg(unix)]
pub use atomic_write::NEW_FILE_MODE;
pub use move_file::move_file;
