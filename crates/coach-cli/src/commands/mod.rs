pub mod logging;
pub mod practice;

use anyhow::{Context, Result};
use coach_infrastructure::CoachConfig;
use std::path::Path;

pub fn load_config(path: Option<&Path>) -> Result<CoachConfig> {
    CoachConfig::load(path).context("Failed to load coach configuration")
}
