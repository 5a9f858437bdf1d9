//! Label commands. Removing a label strips it from every task.

use clap::Subcommand;
use taskpulse_core::{Clock, Label, SystemClock};

use super::{open_repository, print_json, CommandResult};

#[derive(Subcommand)]
pub enum LabelAction {
    /// Create a label
    Add { name: String },
    /// List labels
    List,
    /// Rename a label
    Rename {
        /// Label ID
        id: String,
        name: String,
    },
    /// Delete a label
    Remove {
        /// Label ID
        id: String,
    },
}

pub fn run(action: LabelAction) -> CommandResult {
    let repo = open_repository()?;
    let data = repo.load()?;

    match action {
        LabelAction::Add { name } => {
            let label = Label::new(name);
            repo.save(&data.add_label(label.clone()))?;
            print_json(&label)?;
        }
        LabelAction::List => print_json(&data.labels)?,
        LabelAction::Rename { id, name } => {
            let data = data.rename_label(&id, &name)?;
            repo.save(&data)?;
            print_json(&data.label(&id))?;
        }
        LabelAction::Remove { id } => {
            let data = data.remove_label(&id, &SystemClock.now())?;
            repo.save(&data)?;
            println!("Label removed: {id}");
        }
    }
    Ok(())
}
