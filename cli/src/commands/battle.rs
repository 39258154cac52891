use anyhow::{Result, bail};

use meal_max_core::battle::{BattleError, BattleModel, ThreadRandom, battle_score};
use meal_max_core::store::MealStore;

use super::helpers::exit_missing;

pub(crate) fn cmd_battle(store: &MealStore, first: i64, second: i64, json: bool) -> Result<()> {
    if first == second {
        bail!("A meal cannot battle itself");
    }

    let mut model = BattleModel::new();
    for id in [first, second] {
        match store.get_by_id(id) {
            Ok(meal) => model.prep_combatant(meal)?,
            Err(e) if e.is_missing() => exit_missing(&e, json),
            Err(e) => return Err(e.into()),
        }
    }

    let scores: Vec<(String, f64)> = model
        .combatants()
        .iter()
        .map(|m| (m.meal.clone(), battle_score(m)))
        .collect();

    let winner = match model.battle(store, &ThreadRandom) {
        Ok(winner) => winner,
        Err(BattleError::Store(e)) if e.is_missing() => exit_missing(&e, json),
        Err(e) => return Err(e.into()),
    };

    if json {
        let scores: Vec<_> = scores
            .iter()
            .map(|(meal, score)| serde_json::json!({ "meal": meal, "score": score }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "winner": winner,
                "scores": scores,
            }))?
        );
    } else {
        for (meal, score) in &scores {
            println!("  {meal}: {score:.1}");
        }
        println!("Winner: {winner}");
    }
    Ok(())
}
