use std::{
    fs,
    path::Path,
};

use super::LazyError;

/// Splits raw input into words on any whitespace.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Reads the word list, creating an empty one when it does not exist yet.
pub fn read_words(path: &Path) -> Result<Vec<String>, LazyError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, "")?;
        log::info!("Created empty word list at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| LazyError::Custom(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(split_words(&content))
}
