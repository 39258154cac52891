use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use meal_max_core::error::MealError;
use meal_max_core::models::{LeaderboardEntry, Meal};

/// Report a not-found / deleted meal and exit with status 2.
pub(crate) fn exit_missing(err: &MealError, json: bool) -> ! {
    let message = err.to_string();
    if json {
        println!("{}", json_error(&message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn print_meal(meal: &Meal) {
    let id = meal.id;
    let name = &meal.meal;
    let cuisine = &meal.cuisine;
    let price = format_price(meal.price);
    let difficulty = meal.difficulty;
    println!("[{id}] {name} ({cuisine}) — {price} — {difficulty}");
}

pub(crate) fn print_leaderboard_table(entries: &[LeaderboardEntry]) {
    #[derive(Tabled)]
    struct LeaderboardRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Cuisine")]
        cuisine: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Difficulty")]
        difficulty: String,
        #[tabled(rename = "Battles")]
        battles: i64,
        #[tabled(rename = "Wins")]
        wins: i64,
        #[tabled(rename = "Win %")]
        win_pct: String,
    }

    let rows: Vec<LeaderboardRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| LeaderboardRow {
            rank: i + 1,
            id: e.id,
            meal: truncate(&e.meal, 30),
            cuisine: truncate(&e.cuisine, 20),
            price: format_price(e.price),
            difficulty: e.difficulty.to_string(),
            battles: e.battles,
            wins: e.wins,
            win_pct: format!("{:.1}", e.win_pct),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
        .with(Modify::new(Columns::new(6..9)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
