//! Access to the repository that holds branches and their metadata
//!
//! The inventory never talks to git directly. It goes through
//! [`RepositoryGateway`], which is implemented by [`GitRepo`](crate::GitRepo)
//! for real repositories and by [`MemoryGateway`] for tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset};

use crate::{Error, Result};

/// A single `branch.<branch>.<key> = <value>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub branch: String,
    pub key: String,
    pub value: String,
}

/// Last commit time of a branch as reported by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTime {
    /// Commit time in the committer's offset
    pub time: DateTime<FixedOffset>,
    /// Relative label computed by the repository itself, when it provides one
    pub relative_hint: Option<String>,
}

impl ActivityTime {
    pub fn new(time: DateTime<FixedOffset>) -> Self {
        Self {
            time,
            relative_hint: None,
        }
    }
}

/// Operations the inventory needs from a repository
///
/// Reads that cover many branches are batched so a listing costs a constant
/// number of round-trips regardless of how many branches exist.
pub trait RepositoryGateway {
    /// Names of all local branches, in no particular order
    fn list_branch_names(&self) -> Result<Vec<String>>;

    /// The checked-out branch, or `None` for a detached or unborn HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    /// Every stored per-branch metadata entry
    fn list_metadata_entries(&self) -> Result<Vec<MetadataEntry>>;

    /// Last commit times for `branches` in a single query
    fn batch_last_activity_times(&self, branches: &[String]) -> Result<HashMap<String, ActivityTime>>;

    /// One metadata value; empty when unset
    fn get_metadata(&self, branch: &str, key: &str) -> Result<String>;

    /// Store one metadata value
    fn set_metadata(&mut self, branch: &str, key: &str, value: &str) -> Result<()>;

    /// Remove one metadata value. Removing a missing value is not an error.
    fn unset_metadata(&mut self, branch: &str, key: &str) -> Result<()>;
}

/// In-memory repository
#[derive(Debug, Default)]
pub struct MemoryGateway {
    branches: Vec<String>,
    current: Option<String>,
    times: HashMap<String, DateTime<FixedOffset>>,
    metadata: BTreeMap<(String, String), String>,
    activity_queries: Cell<usize>,
    queried_branches: RefCell<Vec<String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch whose last commit happened at `time`
    pub fn with_branch(mut self, name: impl Into<String>, time: DateTime<FixedOffset>) -> Self {
        let name = name.into();
        self.times.insert(name.clone(), time);
        self.branches.push(name);
        self
    }

    /// Add a branch with no resolvable commit
    pub fn with_branch_without_commits(mut self, name: impl Into<String>) -> Self {
        self.branches.push(name.into());
        self
    }

    /// Check out `name`
    pub fn with_current(mut self, name: impl Into<String>) -> Self {
        self.current = Some(name.into());
        self
    }

    /// Store a metadata value
    pub fn with_metadata(
        mut self,
        branch: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata
            .insert((branch.into(), key.into()), value.into());
        self
    }

    /// Number of batched activity queries served so far
    pub fn activity_queries(&self) -> usize {
        self.activity_queries.get()
    }

    /// Every branch named in an activity query so far, in request order
    pub fn queried_branches(&self) -> Vec<String> {
        self.queried_branches.borrow().clone()
    }
}

impl RepositoryGateway for MemoryGateway {
    fn list_branch_names(&self) -> Result<Vec<String>> {
        Ok(self.branches.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current.clone())
    }

    fn list_metadata_entries(&self) -> Result<Vec<MetadataEntry>> {
        Ok(self
            .metadata
            .iter()
            .map(|((branch, key), value)| MetadataEntry {
                branch: branch.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn batch_last_activity_times(&self, branches: &[String]) -> Result<HashMap<String, ActivityTime>> {
        self.activity_queries.set(self.activity_queries.get() + 1);
        self.queried_branches.borrow_mut().extend_from_slice(branches);

        Ok(branches
            .iter()
            .filter_map(|branch| {
                self.times
                    .get(branch)
                    .map(|time| (branch.clone(), ActivityTime::new(*time)))
            })
            .collect())
    }

    fn get_metadata(&self, branch: &str, key: &str) -> Result<String> {
        Ok(self
            .metadata
            .get(&(branch.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn set_metadata(&mut self, branch: &str, key: &str, value: &str) -> Result<()> {
        if !self.branches.iter().any(|b| b == branch) {
            return Err(Error::Gateway(format!("No such branch: {}", branch)));
        }
        self.metadata
            .insert((branch.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn unset_metadata(&mut self, branch: &str, key: &str) -> Result<()> {
        self.metadata.remove(&(branch.to_string(), key.to_string()));
        Ok(())
    }
}
