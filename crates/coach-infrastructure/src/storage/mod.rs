//! Storage layer for atomic table files.

mod atomic_file;
mod file_store;

pub use atomic_file::{AtomicFileError, AtomicTextFile};
pub use file_store::FileStore;
