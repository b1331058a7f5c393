//! The set of branches being inventoried
//!
//! [`BranchCatalog`] resolves branch names, property names and recency through
//! a [`RepositoryGateway`] and memoizes them in an explicit cache that lives
//! until [`BranchCatalog::refresh`] is called.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use regex::Regex;

use crate::gateway::RepositoryGateway;
use crate::recency::{RecencyMark, SECONDS_PER_DAY};
use crate::{Error, Result};

/// Property names with built-in meaning to git's upstream tracking
pub const RESERVED_PROPERTIES: &[&str] = &["merge", "remote"];

/// Constants the catalog is built with
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Property names never listed as columns or written by twig
    pub reserved_properties: Vec<String>,
    /// Offset every commit time is shown in
    pub display_offset: FixedOffset,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            reserved_properties: RESERVED_PROPERTIES.iter().map(|p| p.to_string()).collect(),
            display_offset: Utc.fix(),
        }
    }
}

/// Which branches a listing includes
///
/// Every filter that is set must pass.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Drop branches whose last commit is older than this many days
    pub max_days_old: Option<f64>,
    /// Keep only branch names matching this pattern
    pub name_only: Option<Regex>,
    /// Drop branch names matching this pattern
    pub name_except: Option<Regex>,
}

impl FilterCriteria {
    /// Whether `name` passes both name filters
    pub fn matches_name(&self, name: &str) -> bool {
        if let Some(only) = &self.name_only {
            if !only.is_match(name) {
                return false;
            }
        }
        if let Some(except) = &self.name_except {
            if except.is_match(name) {
                return false;
            }
        }
        true
    }

    /// Whether `mark` falls before the `max_days_old` cutoff measured from `now`
    pub fn is_too_old(&self, mark: &RecencyMark, now: DateTime<Utc>) -> bool {
        match self.max_days_old {
            Some(days) => {
                let cutoff = now.timestamp() as f64 - days * SECONDS_PER_DAY as f64;
                (mark.timestamp() as f64) < cutoff
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct CatalogCache {
    /// Every branch name, deduplicated and sorted
    branches: Option<Vec<String>>,
    properties: Option<Vec<String>>,
    /// Marks resolved so far; grows as name filters widen
    recency: HashMap<String, RecencyMark>,
    current_branch: Option<Option<String>>,
}

/// Branches of one repository with their resolved properties and recency
#[derive(Debug)]
pub struct BranchCatalog<G> {
    gateway: G,
    config: CatalogConfig,
    now: DateTime<Utc>,
    cache: CatalogCache,
}

impl<G: RepositoryGateway> BranchCatalog<G> {
    /// Create a catalog that labels recency relative to `now`
    pub fn new(gateway: G, config: CatalogConfig, now: DateTime<Utc>) -> Self {
        Self {
            gateway,
            config,
            now,
            cache: CatalogCache::default(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable gateway access. Callers that write metadata must follow up
    /// with [`invalidate_properties`](Self::invalidate_properties).
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Reference instant for recency labels and the age cutoff
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Drop every cached value and move the reference instant to `now`
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        tracing::debug!("refreshing branch catalog");
        self.now = now;
        self.cache = CatalogCache::default();
    }

    /// Forget the property names after a metadata write
    pub fn invalidate_properties(&mut self) {
        self.cache.properties = None;
    }

    /// Whether `key` is reserved. Config keys are case-insensitive.
    pub fn is_reserved(&self, key: &str) -> bool {
        self.config
            .reserved_properties
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(key))
    }

    fn all_branches(&mut self) -> Result<&[String]> {
        let branches = match self.cache.branches.take() {
            Some(branches) => branches,
            None => {
                let mut branches = self.gateway.list_branch_names()?;
                branches.sort();
                branches.dedup();
                tracing::debug!(count = branches.len(), "loaded branch names");
                branches
            }
        };
        let branches = self.cache.branches.insert(branches);
        Ok(branches.as_slice())
    }

    /// Branch names in lexicographic order that pass the name filters
    pub fn list_branches(&mut self, criteria: &FilterCriteria) -> Result<Vec<String>> {
        Ok(self
            .all_branches()?
            .iter()
            .filter(|name| criteria.matches_name(name))
            .cloned()
            .collect())
    }

    /// Sorted property names found on any branch, excluding reserved ones
    pub fn properties(&mut self) -> Result<Vec<String>> {
        let properties = match self.cache.properties.take() {
            Some(properties) => properties,
            None => {
                let mut keys: Vec<String> = self
                    .gateway
                    .list_metadata_entries()?
                    .into_iter()
                    .map(|entry| entry.key)
                    .filter(|key| !self.is_reserved(key))
                    .collect();
                keys.sort();
                keys.dedup();
                tracing::debug!(count = keys.len(), "loaded branch property names");
                keys
            }
        };
        Ok(self.cache.properties.insert(properties).clone())
    }

    /// Resolve every branch passing the name filters, plus `branch`, that has
    /// no mark yet. Branches excluded by name are never looked up.
    fn resolve_recency(&mut self, criteria: &FilterCriteria, branch: &str) -> Result<()> {
        let mut pending: Vec<String> = self
            .list_branches(criteria)?
            .into_iter()
            .filter(|name| !self.cache.recency.contains_key(name))
            .collect();
        if !self.cache.recency.contains_key(branch) && !pending.iter().any(|name| name == branch) {
            pending.push(branch.to_string());
        }
        if pending.is_empty() {
            return Ok(());
        }

        let times = self.gateway.batch_last_activity_times(&pending)?;
        let offset = self.config.display_offset;
        for (name, activity) in times {
            let mark = RecencyMark::new(activity.time.with_timezone(&offset), self.now);
            tracing::trace!(
                branch = %name,
                label = mark.relative(),
                hint = ?activity.relative_hint,
                "resolved recency"
            );
            self.cache.recency.insert(name, mark);
        }
        Ok(())
    }

    /// Last activity of `branch`
    ///
    /// The first call resolves every branch passing the name filters of
    /// `criteria` in one batched query.
    pub fn recency(&mut self, criteria: &FilterCriteria, branch: &str) -> Result<RecencyMark> {
        if !self.cache.recency.contains_key(branch) {
            self.resolve_recency(criteria, branch)?;
        }
        self.cache
            .recency
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::Gateway(format!("No commit found for branch \"{}\"", branch)))
    }

    /// Stored value of `key` on `branch`; empty when not set
    pub fn property_value(&self, branch: &str, key: &str) -> Result<String> {
        self.gateway.get_metadata(branch, key)
    }

    /// The checked-out branch, if any
    pub fn current_branch(&mut self) -> Result<Option<String>> {
        if let Some(current) = &self.cache.current_branch {
            return Ok(current.clone());
        }
        let current = self.gateway.current_branch()?;
        self.cache.current_branch = Some(current.clone());
        Ok(current)
    }
}
