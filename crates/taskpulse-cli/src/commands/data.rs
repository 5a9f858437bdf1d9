use std::path::PathBuf;

use clap::Subcommand;

use super::{open_repository, CommandResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the snapshot as pretty JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the snapshot with a previously exported file
    Import {
        /// JSON file with tasks, projects and labels
        file: PathBuf,
    },
}

pub fn run(action: DataAction) -> CommandResult {
    let repo = open_repository()?;

    match action {
        DataAction::Export { output } => {
            let json = repo.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let data = repo.import(&json)?;
            println!(
                "Imported {} tasks, {} projects, {} labels",
                data.tasks.len(),
                data.projects.len(),
                data.labels.len()
            );
        }
    }
    Ok(())
}
