use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::Serialize;

use crate::core::LazyError;

const APP_NAME: &str = "lazy-english";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME)
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

/// Serializes `data` as pretty JSON and swaps it into place with a rename, so
/// readers see either the previous file or the complete new one.
pub fn save_json_atomic<T: Serialize>(data: &T, path: &Path) -> Result<(), LazyError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(data)?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, json)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    log::debug!("Data saved to: {}", path.display());
    Ok(())
}

/// Reads a file that may legitimately be absent. `Ok(None)` for a missing file.
pub fn read_optional(path: &Path) -> Result<Option<String>, LazyError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_data_file(path: &Path) -> Result<(), LazyError> {
    if path.exists() {
        fs::remove_file(path)?;
        log::info!("Deleted: {}", path.display());
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
