//! Project commands. Removing a project moves its tasks back to the inbox.

use clap::Subcommand;
use taskpulse_core::{Clock, Project, SystemClock};

use super::{open_repository, print_json, CommandResult};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add {
        name: String,
        /// Hex color, e.g. "#5CC8FF" (default: picked from a palette)
        #[arg(long)]
        color: Option<String>,
    },
    /// List projects
    List,
    /// Rename a project
    Rename {
        /// Project ID
        id: String,
        name: String,
    },
    /// Delete a project; its tasks are kept
    Remove {
        /// Project ID
        id: String,
    },
}

pub fn run(action: ProjectAction) -> CommandResult {
    let repo = open_repository()?;
    let data = repo.load()?;

    match action {
        ProjectAction::Add { name, color } => {
            let project = Project::new(name, color);
            repo.save(&data.add_project(project.clone()))?;
            print_json(&project)?;
        }
        ProjectAction::List => print_json(&data.projects)?,
        ProjectAction::Rename { id, name } => {
            let data = data.rename_project(&id, &name)?;
            repo.save(&data)?;
            print_json(&data.project(&id))?;
        }
        ProjectAction::Remove { id } => {
            let data = data.remove_project(&id, &SystemClock.now())?;
            repo.save(&data)?;
            println!("Project removed: {id}");
        }
    }
    Ok(())
}
