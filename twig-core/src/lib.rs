//! Twig Core - Branch inventory for git repositories
//!
//! This crate lists a repository's branches together with user-defined
//! branch properties and how recently each branch saw a commit, rendered as
//! a fixed-width table with the most recently active branches first.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod git;
pub mod recency;
pub mod render;

pub use catalog::{BranchCatalog, CatalogConfig, FilterCriteria, RESERVED_PROPERTIES};
pub use config::{Config, ListConfig, PropertiesConfig, TimeZoneSetting};
pub use engine::{EngineSettings, InventoryEngine, OptionKey};
pub use error::{Error, Result};
pub use gateway::{ActivityTime, MemoryGateway, MetadataEntry, RepositoryGateway};
pub use git::GitRepo;
pub use recency::{relative_label, Clock, FixedClock, RecencyMark, SystemClock};
pub use render::{Color, Layout, Style, TableRenderer, Weight};
