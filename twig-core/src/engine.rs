//! Top-level branch inventory
//!
//! [`InventoryEngine`] holds the options for one run, renders the listing and
//! reads or writes single branch properties.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::catalog::{BranchCatalog, CatalogConfig, FilterCriteria};
use crate::gateway::RepositoryGateway;
use crate::recency::Clock;
use crate::render::{Layout, TableRenderer};
use crate::{Error, Result};

/// Options that can be set for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// Branch targeted by property reads and writes
    Branch,
    MaxDaysOld,
    NameOnly,
    NameExcept,
}

impl OptionKey {
    /// Command-line flag name, used in error messages
    pub fn flag(self) -> &'static str {
        match self {
            OptionKey::Branch => "branch",
            OptionKey::MaxDaysOld => "max-days-old",
            OptionKey::NameOnly => "only-branch",
            OptionKey::NameExcept => "except-branch",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for OptionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "branch" => Ok(OptionKey::Branch),
            "max-days-old" | "max_days_old" => Ok(OptionKey::MaxDaysOld),
            "only-branch" | "name_only" => Ok(OptionKey::NameOnly),
            "except-branch" | "name_except" => Ok(OptionKey::NameExcept),
            other => Err(Error::Config(format!("Unknown option: {}", other))),
        }
    }
}

/// Construction-time constants for an engine
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub catalog: CatalogConfig,
    pub layout: Layout,
}

/// Property names must be valid git config variable names:
/// a letter followed by letters, digits or dashes.
fn validate_property_name(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidProperty(key.to_string()))
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn parse_days(key: OptionKey, value: &str) -> Result<f64> {
    let invalid = || Error::InvalidNumericOption {
        flag: key.flag().to_string(),
        value: value.to_string(),
    };

    let days: f64 = value.trim().parse().map_err(|_| invalid())?;
    if days.is_finite() {
        Ok(days)
    } else {
        Err(invalid())
    }
}

/// Branch inventory for one repository
pub struct InventoryEngine<G> {
    catalog: BranchCatalog<G>,
    renderer: TableRenderer,
    criteria: FilterCriteria,
    branch: Option<String>,
    clock: Box<dyn Clock>,
}

impl<G: fmt::Debug> fmt::Debug for InventoryEngine<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryEngine")
            .field("catalog", &self.catalog)
            .field("criteria", &self.criteria)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

impl<G: RepositoryGateway> InventoryEngine<G> {
    /// Create an engine; recency is measured from `clock.now()` at this point
    pub fn new(gateway: G, settings: EngineSettings, clock: impl Clock + 'static) -> Self {
        let now = clock.now();
        Self {
            catalog: BranchCatalog::new(gateway, settings.catalog, now),
            renderer: TableRenderer::new(settings.layout),
            criteria: FilterCriteria::default(),
            branch: None,
            clock: Box::new(clock),
        }
    }

    pub fn gateway(&self) -> &G {
        self.catalog.gateway()
    }

    /// Current filters
    pub fn options(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Branch chosen with [`OptionKey::Branch`], if any
    pub fn branch_option(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Validate and store an option
    pub fn set_option(&mut self, key: OptionKey, value: &str) -> Result<()> {
        match key {
            OptionKey::Branch => {
                let branches = self.catalog.list_branches(&self.criteria)?;
                if !branches.iter().any(|branch| branch == value) {
                    return Err(Error::UnknownBranch(value.to_string()));
                }
                self.branch = Some(value.to_string());
            }
            OptionKey::MaxDaysOld => {
                self.criteria.max_days_old = Some(parse_days(key, value)?);
            }
            OptionKey::NameOnly => {
                self.criteria.name_only = Some(compile_pattern(value)?);
            }
            OptionKey::NameExcept => {
                self.criteria.name_except = Some(compile_pattern(value)?);
            }
        }

        tracing::debug!(option = %key, value, "option set");
        Ok(())
    }

    /// Clear a filter. The branch option cannot be cleared.
    pub fn unset_option(&mut self, key: OptionKey) {
        match key {
            OptionKey::MaxDaysOld => self.criteria.max_days_old = None,
            OptionKey::NameOnly => self.criteria.name_only = None,
            OptionKey::NameExcept => self.criteria.name_except = None,
            OptionKey::Branch => return,
        }
        tracing::debug!(option = %key, "option cleared");
    }

    /// The checked-out branch, or `None` when HEAD is detached or unborn
    pub fn current_branch(&mut self) -> Result<Option<String>> {
        self.catalog.current_branch()
    }

    /// Branch that property reads and writes apply to
    pub fn target_branch(&mut self) -> Result<String> {
        if let Some(branch) = &self.branch {
            return Ok(branch.clone());
        }
        self.current_branch()?.ok_or(Error::NoCurrentBranch)
    }

    /// Read one property of `branch`; empty when not set
    pub fn get_property(&self, branch: &str, key: &str) -> Result<String> {
        validate_property_name(key)?;
        self.catalog.property_value(branch, key)
    }

    /// Store `value` as `key` on `branch`, or remove it when `value` is empty
    ///
    /// Returns a confirmation line for the user.
    pub fn set_property(&mut self, branch: &str, key: &str, value: &str) -> Result<String> {
        validate_property_name(key)?;
        if self.catalog.is_reserved(key) {
            return Err(Error::ReservedProperty(key.to_string()));
        }

        let message = if value.is_empty() {
            self.catalog.gateway_mut().unset_metadata(branch, key)?;
            format!("Removed {} for {}", key, branch)
        } else {
            self.catalog.gateway_mut().set_metadata(branch, key, value)?;
            format!("Saved {}={} for {}", key, value, branch)
        };

        self.catalog.invalidate_properties();
        tracing::info!(branch, key, "{}", message);
        Ok(message)
    }

    /// Render the branch table for the current options
    pub fn render_listing(&mut self) -> Result<String> {
        let current = self.catalog.current_branch()?;
        self.renderer
            .render(&mut self.catalog, &self.criteria, current.as_deref())
    }

    /// Re-read the clock and drop everything cached from the repository
    pub fn refresh(&mut self) {
        let now = self.clock.now();
        self.catalog.refresh(now);
    }
}
