pub mod config;
pub mod data;
pub mod label;
pub mod project;
pub mod risk;
pub mod stats;
pub mod task;

use serde::Serialize;
use taskpulse_core::{FileStore, Repository};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Repository over the default data directory.
pub fn open_repository() -> Result<Repository<FileStore>, Box<dyn std::error::Error>> {
    Ok(Repository::new(FileStore::open_default()?))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
