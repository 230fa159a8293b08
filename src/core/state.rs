use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    Config,
    LazyError,
};
use crate::persistence::{
    delete_data_file,
    read_optional,
    save_json_atomic,
};

/// What has been confirmed to exist in Anki, and under which configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralState {
    pub config_changed: bool,
    #[serde(default)]
    pub created_models: Vec<String>,
    #[serde(default)]
    pub created_decks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_with: Option<Config>,
}

impl Default for StructuralState {
    fn default() -> Self {
        Self {
            config_changed: true,
            created_models: Vec::new(),
            created_decks: Vec::new(),
            provisioned_with: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Model and deck must be (re)provisioned before notes go out.
    Stale,
    Fresh,
}

#[derive(Debug)]
pub struct ConfigStateTracker {
    path: PathBuf,
    state: StructuralState,
    active: Config,
}

impl ConfigStateTracker {
    pub fn from_config(config: &Config) -> Result<Self, LazyError> {
        Self::load(&config.state_path, config)
    }

    /// A missing record means first run. A record that cannot be parsed is an
    /// error: guessing could create duplicate models or decks.
    pub fn load(path: &Path, active: &Config) -> Result<Self, LazyError> {
        let content = read_optional(path).map_err(|e| {
            LazyError::ConfigIo(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut state = match content {
            Some(content) if !content.trim().is_empty() => {
                serde_json::from_str::<StructuralState>(&content).map_err(|e| {
                    LazyError::ConfigIo(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            _ => {
                log::info!("No structural state at {}, provisioning required", path.display());
                StructuralState::default()
            }
        };

        if let Some(previous) = &state.provisioned_with {
            let changed = previous.diff(active);
            if !changed.is_empty() {
                log::info!("Configuration changed since last provisioning: {}", changed.join(", "));
                state.config_changed = true;
            }
        }

        Ok(Self { path: path.to_path_buf(), state, active: active.clone() })
    }

    pub fn freshness(&self) -> Freshness {
        if self.state.config_changed {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    pub fn needs_provisioning(&self) -> bool {
        self.freshness() == Freshness::Stale
    }

    pub fn state(&self) -> &StructuralState {
        &self.state
    }

    /// Stale → Fresh. `models` and `decks` are the names created in this
    /// provisioning; objects that already existed in Anki are not recorded, so a
    /// reset never deletes them.
    pub fn record_provisioned(
        &mut self,
        config: &Config,
        models: &[String],
        decks: &[String],
    ) -> Result<(), LazyError> {
        for model in models {
            if !self.state.created_models.contains(model) {
                self.state.created_models.push(model.clone());
            }
        }
        for deck in decks {
            if !self.state.created_decks.contains(deck) {
                self.state.created_decks.push(deck.clone());
            }
        }
        self.state.config_changed = false;
        self.state.provisioned_with = Some(config.clone());
        self.persist()
    }

    /// Called whenever a configuration is saved. Goes Stale if any field differs
    /// from the configuration of the last provisioning. Returns the new freshness.
    pub fn config_saved(&mut self, config: &Config) -> Result<Freshness, LazyError> {
        let changed = match &self.state.provisioned_with {
            Some(previous) => previous.diff(config),
            None => self.active.diff(config),
        };
        if !changed.is_empty() {
            log::info!("Configuration fields changed: {}", changed.join(", "));
            self.state.config_changed = true;
        }
        self.active = config.clone();
        self.persist()?;
        Ok(self.freshness())
    }

    /// Forces the next run to provision again.
    pub fn invalidate(&mut self) -> Result<(), LazyError> {
        self.state.config_changed = true;
        self.persist()
    }

    /// Removes the record; the tracker is back in its first-run condition.
    pub fn reset(&mut self) -> Result<(), LazyError> {
        self.state = StructuralState::default();
        Self::reset_at(&self.path)
    }

    /// Removes the record at `path` without reading it first, so an unreadable
    /// record can still be cleared.
    pub fn reset_at(path: &Path) -> Result<(), LazyError> {
        delete_data_file(path)
            .map_err(|e| LazyError::ConfigIo(format!("Failed to delete {}: {}", path.display(), e)))
    }

    fn persist(&self) -> Result<(), LazyError> {
        save_json_atomic(&self.state, &self.path).map_err(|e| {
            LazyError::ConfigIo(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}
