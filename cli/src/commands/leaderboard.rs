use anyhow::Result;

use meal_max_core::store::MealStore;

use super::helpers::print_leaderboard_table;

pub(crate) fn cmd_leaderboard(store: &MealStore, sort_by: &str, json: bool) -> Result<()> {
    let entries = store.leaderboard(sort_by)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No meals yet. Add one with `meal-max add`.");
        return Ok(());
    }

    print_leaderboard_table(&entries);
    Ok(())
}
