//! List command - the branch table

use clap::Args;
use twig_core::{Config, InventoryEngine, OptionKey, RepositoryGateway};

/// Filters for the branch listing
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only list branches with a commit in the last DAYS days
    #[arg(long, global = true, value_name = "DAYS")]
    pub max_days_old: Option<String>,

    /// Only list branches whose name matches PATTERN
    #[arg(long, global = true, value_name = "PATTERN")]
    pub only_branch: Option<String>,

    /// Hide branches whose name matches PATTERN
    #[arg(long, global = true, value_name = "PATTERN")]
    pub except_branch: Option<String>,

    /// Ignore filters from the config file and environment
    #[arg(long, global = true)]
    pub all: bool,

    /// Show commit times in UTC instead of the local offset
    #[arg(long, global = true)]
    pub utc: bool,
}

impl FilterArgs {
    /// Apply configured defaults (unless `--all`) and then the flags given here
    pub fn apply<G: RepositoryGateway>(
        &self,
        engine: &mut InventoryEngine<G>,
        config: &Config,
    ) -> anyhow::Result<()> {
        if !self.all {
            for (key, value) in config.default_options() {
                engine.set_option(key, &value)?;
            }
        }

        let flags = [
            (OptionKey::MaxDaysOld, &self.max_days_old),
            (OptionKey::NameOnly, &self.only_branch),
            (OptionKey::NameExcept, &self.except_branch),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                engine.set_option(key, value)?;
            }
        }

        Ok(())
    }
}

/// Print the branch table
pub fn list<G: RepositoryGateway>(engine: &mut InventoryEngine<G>) -> anyhow::Result<()> {
    let listing = engine.render_listing()?;
    println!("{}", listing);
    Ok(())
}
