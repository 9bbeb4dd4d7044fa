//! Configuration validation.

use crate::config::Config;
use crate::constants::MAX_MERGE_WINDOW_MINUTES;
use crate::error::{Error, Result};
use crate::utils::date::parse_utc_offset;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_defaults(config)?;
    validate_groups(config)?;
    Ok(())
}

/// Validate a merge window in minutes.
pub fn validate_window(minutes: f64) -> Result<()> {
    if !(minutes > 0.0 && minutes <= MAX_MERGE_WINDOW_MINUTES) {
        return Err(Error::ConfigValidation {
            message: format!(
                "window_minutes must be greater than 0 and at most {MAX_MERGE_WINDOW_MINUTES}, got {minutes}"
            ),
        });
    }
    Ok(())
}

/// Validate default settings.
fn validate_defaults(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    validate_window(defaults.window_minutes)?;

    if let Some(ref offset) = defaults.utc_offset
        && parse_utc_offset(offset).is_none()
    {
        return Err(Error::ConfigValidation {
            message: format!("utc_offset is not a valid UTC offset: '{offset}'"),
        });
    }

    Ok(())
}

/// Validate station groups.
fn validate_groups(config: &Config) -> Result<()> {
    for (name, members) in &config.groups {
        if name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "group names must not be empty".to_string(),
            });
        }
        if members.iter().all(|m| m.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: format!("group '{name}' has no stations"),
            });
        }
    }
    Ok(())
}
