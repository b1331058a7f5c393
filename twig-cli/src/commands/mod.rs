//! CLI command implementations

pub mod list;
pub mod property;

pub use list::{list, FilterArgs};
pub use property::{GetArgs, SetArgs, UnsetArgs};
