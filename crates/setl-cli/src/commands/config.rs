//! `setl config` command implementation

use crate::config::Config;
use crate::error::Result;

/// Show the effective configuration
pub fn show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
