//! Local branch discovery and last commit times

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use git2::BranchType;

use super::repo::GitRepo;
use crate::gateway::ActivityTime;
use crate::{Error, Result};

/// Convert a libgit2 commit time into a chrono timestamp in the committer's offset
fn commit_time(time: git2::Time) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).ok_or_else(|| {
        Error::Gateway(format!(
            "Invalid commit time offset: {} minutes",
            time.offset_minutes()
        ))
    })?;

    let utc = DateTime::from_timestamp(time.seconds(), 0).ok_or_else(|| {
        Error::Gateway(format!("Invalid commit timestamp: {}", time.seconds()))
    })?;

    Ok(utc.with_timezone(&offset))
}

impl GitRepo {
    /// List all local branches
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let mut branches = Vec::new();

        for branch in self
            .inner()
            .branches(Some(BranchType::Local))
            .map_err(|e| Error::Gateway(format!("Failed to list branches: {}", e)))?
        {
            let (branch, _) =
                branch.map_err(|e| Error::Gateway(format!("Failed to read branch: {}", e)))?;
            match branch.name() {
                Ok(Some(name)) => branches.push(name.to_string()),
                _ => tracing::warn!("Skipping branch with a non UTF-8 name"),
            }
        }

        tracing::debug!(count = branches.len(), "listed local branches");
        Ok(branches)
    }

    /// Committer time of the tip commit of every branch in `branches`
    pub fn last_commit_times(&self, branches: &[String]) -> Result<HashMap<String, ActivityTime>> {
        let mut times = HashMap::with_capacity(branches.len());

        for name in branches {
            let branch = self
                .inner()
                .find_branch(name, BranchType::Local)
                .map_err(|e| Error::Gateway(format!("Branch '{}' not found: {}", name, e)))?;
            let commit = branch.get().peel_to_commit().map_err(|e| {
                Error::Gateway(format!("Failed to resolve commit for {}: {}", name, e))
            })?;

            let time = commit_time(commit.committer().when())?;
            times.insert(name.clone(), ActivityTime::new(time));
        }

        tracing::debug!(count = times.len(), "resolved last commit times");
        Ok(times)
    }
}
