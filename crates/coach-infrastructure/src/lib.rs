pub mod config;
pub mod paths;
pub mod storage;

pub use crate::config::CoachConfig;
pub use crate::paths::CoachPaths;
pub use crate::storage::FileStore;
