//! JSON settings record loader
//!
//! The stored record uses the same snake_case keys as [`SystemSettings`];
//! `credit` and `cycle` may be omitted and fall back to their defaults.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use super::SystemSettings;
use crate::error::LoadError;

/// File name of the settings record inside a ledger directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Load settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SystemSettings, LoadError> {
    let file = File::open(path)?;
    load_settings_from_reader(BufReader::new(file))
}

/// Load settings from any reader
pub fn load_settings_from_reader<R: Read>(reader: R) -> Result<SystemSettings, LoadError> {
    let settings: SystemSettings = serde_json::from_reader(reader)?;
    Ok(settings)
}

/// Write settings as pretty-printed JSON
pub fn save_settings<P: AsRef<Path>>(path: P, settings: &SystemSettings) -> Result<(), LoadError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), settings)?;
    Ok(())
}
