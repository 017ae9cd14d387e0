use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// A named team of players and the avatar they picked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub group_name: String,
    #[serde(default)]
    pub player_names: Vec<String>,
    #[serde(default)]
    pub avatar: String,
}

impl GroupData {
    pub fn new(group_name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            player_names: Vec::new(),
            avatar: avatar.into(),
        }
    }

    pub fn with_player(mut self, name: impl Into<String>) -> Self {
        self.player_names.push(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub groups: Vec<GroupData>,
}

/// JSON file holding every registered group. Each save rewrites the file.
#[derive(Debug, Clone)]
pub struct GroupStore {
    path: PathBuf,
}

impl GroupStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored data; a missing file means no groups yet.
    pub fn load(&self) -> Result<GameData> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(GameData::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("unable to read {}", self.path.display()));
            }
        };
        serde_json::from_str(&json)
            .with_context(|| format!("invalid group data in {}", self.path.display()))
    }

    /// Appends `group` and writes the whole file back.
    pub fn save_group(&self, group: GroupData) -> Result<()> {
        let mut data = self.load()?;
        info!(
            "Saving group {} with {} player(s)",
            group.group_name,
            group.player_names.len()
        );
        data.groups.push(group);
        let json = serde_json::to_string(&data).context("unable to serialize group data")?;
        fs::write(&self.path, json)
            .with_context(|| format!("unable to write {}", self.path.display()))
    }

    pub fn find_group(&self, name: &str) -> Result<Option<GroupData>> {
        let group = self
            .load()?
            .groups
            .into_iter()
            .find(|group| group.group_name == name);
        if group.is_none() {
            warn!("Group not found: {name}");
        }
        Ok(group)
    }
}
