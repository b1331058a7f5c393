//! Branch metadata stored as `branch.<name>.<key>` config entries

use super::repo::GitRepo;
use crate::gateway::MetadataEntry;
use crate::{Error, Result};

/// Split `branch.<name>.<key>` into its branch and key.
///
/// Config variable names never contain dots, so the key is everything after
/// the last one. Branch names may contain dots.
fn parse_branch_key(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix("branch.")?;
    let (branch, key) = rest.rsplit_once('.')?;
    if branch.is_empty() || key.is_empty() {
        return None;
    }
    Some((branch, key))
}

fn config_name(branch: &str, key: &str) -> String {
    format!("branch.{}.{}", branch, key)
}

impl GitRepo {
    /// All `branch.*.*` entries across every config level
    pub fn branch_config_entries(&self) -> Result<Vec<MetadataEntry>> {
        let config = self.inner().config()?;
        let mut entries = Vec::new();

        let mut iter = config.entries(Some(r"^branch\."))?;
        while let Some(entry) = iter.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                if let Some((branch, key)) = parse_branch_key(name) {
                    entries.push(MetadataEntry {
                        branch: branch.to_string(),
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        tracing::debug!(count = entries.len(), "read branch config entries");
        Ok(entries)
    }

    /// Read `branch.<branch>.<key>`, empty when unset
    pub fn branch_config_value(&self, branch: &str, key: &str) -> Result<String> {
        let config = self.inner().config()?;
        match config.get_string(&config_name(branch, key)) {
            Ok(value) => Ok(value),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(String::new()),
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// Write `branch.<branch>.<key>`
    pub fn set_branch_config_value(&self, branch: &str, key: &str, value: &str) -> Result<()> {
        let mut config = self.inner().config()?;
        config.set_str(&config_name(branch, key), value)?;
        tracing::debug!(branch, key, "saved branch property");
        Ok(())
    }

    /// Remove `branch.<branch>.<key>` if present
    pub fn unset_branch_config_value(&self, branch: &str, key: &str) -> Result<()> {
        let mut config = self.inner().config()?;
        match config.remove(&config_name(branch, key)) {
            Ok(()) => {
                tracing::debug!(branch, key, "removed branch property");
                Ok(())
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(()),
            Err(e) => Err(Error::Git(e)),
        }
    }
}
