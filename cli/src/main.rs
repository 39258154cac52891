mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_add, cmd_battle, cmd_clear, cmd_delete, cmd_leaderboard, cmd_record, cmd_show,
};
use crate::config::Config;
use meal_max_core::store::MealStore;

#[derive(Parser)]
#[command(
    name = "meal-max",
    version,
    about = "Pit meals against each other and keep score"
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a meal to the catalog
    Add {
        /// Meal name (unique among live meals)
        meal: String,
        /// Cuisine, e.g. "korean"
        cuisine: String,
        /// Price, must be a positive number
        price: String,
        /// Difficulty: LOW, MED or HIGH
        difficulty: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Soft-delete a meal by ID
    Delete {
        /// Meal ID to delete
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a meal by ID or by name
    Show {
        /// Meal ID
        id: Option<i64>,
        /// Look up by meal name instead of ID
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a battle result for a meal
    Record {
        /// Meal ID
        id: i64,
        /// Outcome: win or loss
        outcome: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the leaderboard of live meals
    Leaderboard {
        /// Sort key: wins or win_pct
        #[arg(short, long, default_value = "wins")]
        sort_by: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Battle two meals and record the result
    Battle {
        /// First combatant ID
        first: i64,
        /// Second combatant ID
        second: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop every meal, deleted ones included, and recreate the table
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("Warning: could not initialise logging: {e:#}");
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = MealStore::open(&config.store_config())?;

    match cli.command {
        Commands::Add {
            meal,
            cuisine,
            price,
            difficulty,
            json,
        } => cmd_add(&store, &meal, &cuisine, &price, &difficulty, json),
        Commands::Delete { id, json } => cmd_delete(&store, id, json),
        Commands::Show { id, name, json } => cmd_show(&store, id, name.as_deref(), json),
        Commands::Record { id, outcome, json } => cmd_record(&store, id, &outcome, json),
        Commands::Leaderboard { sort_by, json } => cmd_leaderboard(&store, &sort_by, json),
        Commands::Battle {
            first,
            second,
            json,
        } => cmd_battle(&store, first, second, json),
        Commands::Clear { yes } => cmd_clear(&store, yes),
    }
}
