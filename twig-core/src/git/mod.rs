//! Git operations for Twig
//!
//! This module provides repository detection, branch discovery, and
//! branch metadata stored in git config. [`GitRepo`] is the production
//! [`RepositoryGateway`].

mod branch;
mod metadata;
mod repo;

use std::collections::HashMap;

pub use repo::GitRepo;

use crate::gateway::{ActivityTime, MetadataEntry, RepositoryGateway};
use crate::Result;

impl RepositoryGateway for GitRepo {
    fn list_branch_names(&self) -> Result<Vec<String>> {
        self.list_local_branches()
    }

    fn current_branch(&self) -> Result<Option<String>> {
        GitRepo::current_branch(self)
    }

    fn list_metadata_entries(&self) -> Result<Vec<MetadataEntry>> {
        self.branch_config_entries()
    }

    fn batch_last_activity_times(&self, branches: &[String]) -> Result<HashMap<String, ActivityTime>> {
        self.last_commit_times(branches)
    }

    fn get_metadata(&self, branch: &str, key: &str) -> Result<String> {
        self.branch_config_value(branch, key)
    }

    fn set_metadata(&mut self, branch: &str, key: &str, value: &str) -> Result<()> {
        self.set_branch_config_value(branch, key, value)
    }

    fn unset_metadata(&mut self, branch: &str, key: &str) -> Result<()> {
        self.unset_branch_config_value(branch, key)
    }
}
