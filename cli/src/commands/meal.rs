use anyhow::{Result, bail};

use meal_max_core::models::parse_price;
use meal_max_core::store::MealStore;

use super::helpers::{exit_missing, print_meal};

pub(crate) fn cmd_add(
    store: &MealStore,
    meal: &str,
    cuisine: &str,
    price: &str,
    difficulty: &str,
    json: bool,
) -> Result<()> {
    let price = parse_price(price)?;
    let id = store.create(meal, cuisine, price, difficulty)?;

    if json {
        let created = store.get_by_id(id)?;
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("Added meal {id}: {meal}");
    }
    Ok(())
}

pub(crate) fn cmd_delete(store: &MealStore, id: i64, json: bool) -> Result<()> {
    match store.delete(id) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted meal {id}");
            }
            Ok(())
        }
        Err(e) if e.is_missing() => exit_missing(&e, json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cmd_show(
    store: &MealStore,
    id: Option<i64>,
    name: Option<&str>,
    json: bool,
) -> Result<()> {
    let found = match (id, name) {
        (Some(id), None) => store.get_by_id(id),
        (None, Some(name)) => store.get_by_name(name),
        _ => bail!("Provide exactly one of <ID> or --name"),
    };

    match found {
        Ok(meal) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&meal)?);
            } else {
                print_meal(&meal);
            }
            Ok(())
        }
        Err(e) if e.is_missing() => exit_missing(&e, json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cmd_record(store: &MealStore, id: i64, outcome: &str, json: bool) -> Result<()> {
    match store.update_stats(id, outcome) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "id": id, "result": outcome }));
            } else {
                println!("Recorded {outcome} for meal {id}");
            }
            Ok(())
        }
        Err(e) if e.is_missing() => exit_missing(&e, json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cmd_clear(store: &MealStore, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to clear every meal without --yes");
    }
    store.clear()?;
    println!(
        "Cleared all meals (schema: {})",
        store.schema_path().display()
    );
    Ok(())
}
