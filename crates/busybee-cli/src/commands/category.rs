//! Category management commands for CLI.

use clap::Subcommand;

use super::open_store;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category (or return the existing one with this name)
    Add {
        /// Category name
        name: String,
        /// Display color as a hex value, e.g. FF8800 (default: FFFFFF)
        #[arg(long)]
        color: Option<String>,
    },
    /// List all categories
    List,
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        CategoryAction::Add { name, color } => {
            let category = store.find_or_create_category(&name, color.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::List => {
            let categories = store.list_categories()?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
    }

    Ok(())
}
