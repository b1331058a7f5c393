//! Property commands - read and write a single branch property

use clap::Args;
use twig_core::{InventoryEngine, RepositoryGateway};

/// Show a property of the branch
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Property name
    pub property: String,
}

impl GetArgs {
    pub fn execute<G: RepositoryGateway>(&self, engine: &mut InventoryEngine<G>) -> anyhow::Result<()> {
        let branch = engine.target_branch()?;
        let value = engine.get_property(&branch, &self.property)?;

        if value.is_empty() {
            anyhow::bail!(
                "The branch \"{}\" does not have the property \"{}\".",
                branch,
                self.property
            );
        }

        println!("{}", value);
        Ok(())
    }
}

/// Set a property on the branch
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Property name
    pub property: String,

    /// New value; an empty string removes the property
    pub value: String,
}

impl SetArgs {
    pub fn execute<G: RepositoryGateway>(&self, engine: &mut InventoryEngine<G>) -> anyhow::Result<()> {
        let branch = engine.target_branch()?;
        let message = engine.set_property(&branch, &self.property, &self.value)?;
        println!("{}", message);
        Ok(())
    }
}

/// Remove a property from the branch
#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// Property name
    pub property: String,
}

impl UnsetArgs {
    pub fn execute<G: RepositoryGateway>(&self, engine: &mut InventoryEngine<G>) -> anyhow::Result<()> {
        let branch = engine.target_branch()?;
        let message = engine.set_property(&branch, &self.property, "")?;
        println!("{}", message);
        Ok(())
    }
}
