use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{SeedConfig, UnresolvedReferencePolicy};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "seed_menu")]
#[command(about = "Replaces the menu catalog in an Appwrite project")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source dataset
    #[arg(short, long, default_value = "fixtures/menu.json")]
    pub data: PathBuf,

    /// Where downloaded images are staged before upload
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub on_unresolved: Option<UnresolvedReferencePolicy>,

    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Erase everything, then create the dataset
    Run,
    /// Erase the collections and the bucket only
    Erase,
}

impl Cli {
    pub fn command(&self) -> Commands { self.command.unwrap_or(Commands::Run) }

    /// Flags win over the environment.
    pub fn apply(&self, config: &mut SeedConfig) {
        if let Some(dir) = &self.scratch_dir {
            config.scratch_dir = dir.clone();
        }
        if let Some(policy) = self.on_unresolved {
            config.unresolved_references = policy;
        }
    }
}
