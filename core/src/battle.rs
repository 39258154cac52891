use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::ConnectionProvider;
use crate::error::MealError;
use crate::models::{Difficulty, Meal, Outcome};
use crate::store::MealStore;

const MAX_COMBATANTS: usize = 2;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("Two combatants must be prepped for a battle.")]
    NotEnoughCombatants,

    #[error("Combatant list is full, cannot add {0}.")]
    RosterFull(String),

    #[error("random source failed: {0}")]
    Random(String),

    #[error(transparent)]
    Store(#[from] MealError),
}

/// Supplies the random draw that decides close battles.
///
/// Injected so callers can swap the thread RNG for a remote or scripted source.
pub trait RandomSource: Send + Sync {
    /// A value in `[0, 1)`.
    fn fraction(&self) -> Result<f64, BattleError>;
}

/// `RandomSource` backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fraction(&self) -> Result<f64, BattleError> {
        Ok(rand::rng().random::<f64>())
    }
}

/// Score used to pit two meals against each other: pricier meals from
/// longer-named cuisines score higher, harder meals lose a little less.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn battle_score(meal: &Meal) -> f64 {
    let modifier = match meal.difficulty {
        Difficulty::High => 1.0,
        Difficulty::Med => 2.0,
        Difficulty::Low => 3.0,
    };
    meal.price * meal.cuisine.chars().count() as f64 - modifier
}

/// A two-slot arena. Winners stay in for the next fight, losers are removed.
#[derive(Debug, Default)]
pub struct BattleModel {
    combatants: Vec<Meal>,
}

impl BattleModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn combatants(&self) -> &[Meal] {
        &self.combatants
    }

    pub fn clear_combatants(&mut self) {
        info!("clearing combatants");
        self.combatants.clear();
    }

    pub fn prep_combatant(&mut self, meal: Meal) -> Result<(), BattleError> {
        if self.combatants.len() >= MAX_COMBATANTS {
            warn!(meal = %meal.meal, "combatant list is full");
            return Err(BattleError::RosterFull(meal.meal));
        }
        info!(meal = %meal.meal, "adding combatant");
        self.combatants.push(meal);
        Ok(())
    }

    /// Fight the two prepped combatants, record the result for both and
    /// return the winner's name.
    ///
    /// The first combatant wins when the normalised score gap exceeds the
    /// random draw, so lopsided matchups favour it and close ones are a coin toss.
    pub fn battle<P: ConnectionProvider>(
        &mut self,
        store: &MealStore<P>,
        random: &dyn RandomSource,
    ) -> Result<String, BattleError> {
        if self.combatants.len() < MAX_COMBATANTS {
            warn!(count = self.combatants.len(), "not enough combatants");
            return Err(BattleError::NotEnoughCombatants);
        }

        let first = &self.combatants[0];
        let second = &self.combatants[1];
        let score_1 = battle_score(first);
        let score_2 = battle_score(second);
        debug!(meal = %first.meal, score = score_1, "scored combatant");
        debug!(meal = %second.meal, score = score_2, "scored combatant");

        let delta = (score_1 - score_2).abs() / 100.0;
        let draw = random.fraction()?;
        if !(0.0..=1.0).contains(&draw) {
            return Err(BattleError::Random(format!("draw {draw} is outside [0, 1]")));
        }
        debug!(delta, draw, "deciding battle");

        let (winner_idx, loser_idx) = if delta > draw { (0, 1) } else { (1, 0) };
        let winner_id = self.combatants[winner_idx].id;
        let loser_id = self.combatants[loser_idx].id;

        store.record_outcome(winner_id, Outcome::Win)?;
        store.record_outcome(loser_id, Outcome::Loss)?;

        let loser = self.combatants.remove(loser_idx);
        let winner = self.combatants[0].meal.clone();
        info!(winner = %winner, loser = %loser.meal, "battle finished");
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{SharedConnection, bundled_schema_path};

    struct FixedRandom(f64);

    impl RandomSource for FixedRandom {
        fn fraction(&self) -> Result<f64, BattleError> {
            Ok(self.0)
        }
    }

    struct FailingRandom;

    impl RandomSource for FailingRandom {
        fn fraction(&self) -> Result<f64, BattleError> {
            Err(BattleError::Random("service unavailable".to_string()))
        }
    }

    fn store() -> MealStore<SharedConnection> {
        MealStore::open_in_memory(bundled_schema_path()).unwrap()
    }

    fn add(
        store: &MealStore<SharedConnection>,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: &str,
    ) -> Meal {
        let id = store.create(name, cuisine, price, difficulty).unwrap();
        store.get_by_id(id).unwrap()
    }

    fn stats(store: &MealStore<SharedConnection>, id: i64) -> (i64, i64) {
        let board = store.leaderboard("wins").unwrap();
        let e = board.iter().find(|e| e.id == id).unwrap();
        (e.battles, e.wins)
    }

    #[test]
    fn test_battle_score() {
        let meal = Meal {
            id: 1,
            meal: "curry".to_string(),
            cuisine: "indian".to_string(),
            price: 4.0,
            difficulty: Difficulty::High,
        };
        // 4.0 * 6 - 1
        assert!((battle_score(&meal) - 23.0).abs() < f64::EPSILON);

        let low = Meal {
            difficulty: Difficulty::Low,
            ..meal
        };
        assert!((battle_score(&low) - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prep_combatant_full() {
        let store = store();
        let mut model = BattleModel::new();
        model.prep_combatant(add(&store, "a", "x", 1.0, "LOW")).unwrap();
        model.prep_combatant(add(&store, "b", "x", 1.0, "LOW")).unwrap();

        let err = model
            .prep_combatant(add(&store, "c", "x", 1.0, "LOW"))
            .unwrap_err();
        assert!(matches!(err, BattleError::RosterFull(ref name) if name == "c"));
        assert_eq!(model.combatants().len(), 2);
    }

    #[test]
    fn test_battle_needs_two() {
        let store = store();
        let mut model = BattleModel::new();
        let err = model.battle(&store, &FixedRandom(0.5)).unwrap_err();
        assert!(matches!(err, BattleError::NotEnoughCombatants));

        model.prep_combatant(add(&store, "a", "x", 1.0, "LOW")).unwrap();
        let err = model.battle(&store, &FixedRandom(0.5)).unwrap_err();
        assert!(matches!(err, BattleError::NotEnoughCombatants));
    }

    #[test]
    fn test_first_combatant_wins_on_large_gap() {
        let store = store();
        let mut model = BattleModel::new();
        // 50 * 6 - 1 = 299 vs 1 * 1 - 3 = -2, delta ~3.01
        let big = add(&store, "feast", "indian", 50.0, "HIGH");
        let small = add(&store, "toast", "x", 1.0, "LOW");
        model.prep_combatant(big.clone()).unwrap();
        model.prep_combatant(small.clone()).unwrap();

        let winner = model.battle(&store, &FixedRandom(0.99)).unwrap();
        assert_eq!(winner, "feast");
        assert_eq!(stats(&store, big.id), (1, 1));
        assert_eq!(stats(&store, small.id), (1, 0));
        assert_eq!(model.combatants().len(), 1);
        assert_eq!(model.combatants()[0].id, big.id);
    }

    #[test]
    fn test_second_combatant_wins_when_draw_exceeds_delta() {
        let store = store();
        let mut model = BattleModel::new();
        let first = add(&store, "pasta", "italian", 2.0, "LOW");
        let second = add(&store, "curry", "indian", 2.0, "LOW");
        model.prep_combatant(first.clone()).unwrap();
        model.prep_combatant(second.clone()).unwrap();

        let winner = model.battle(&store, &FixedRandom(0.5)).unwrap();
        assert_eq!(winner, "curry");
        assert_eq!(stats(&store, first.id), (1, 0));
        assert_eq!(stats(&store, second.id), (1, 1));
        assert_eq!(model.combatants()[0].id, second.id);
    }

    #[test]
    fn test_winner_stays_for_next_battle() {
        let store = store();
        let mut model = BattleModel::new();
        let champ = add(&store, "feast", "indian", 50.0, "HIGH");
        model.prep_combatant(champ.clone()).unwrap();
        model.prep_combatant(add(&store, "toast", "x", 1.0, "LOW")).unwrap();
        model.battle(&store, &FixedRandom(0.1)).unwrap();

        model.prep_combatant(add(&store, "crumb", "y", 1.0, "LOW")).unwrap();
        let winner = model.battle(&store, &FixedRandom(0.1)).unwrap();
        assert_eq!(winner, "feast");
        assert_eq!(stats(&store, champ.id), (2, 2));
    }

    #[test]
    fn test_battle_with_deleted_combatant() {
        let store = store();
        let mut model = BattleModel::new();
        let a = add(&store, "a", "x", 1.0, "LOW");
        let b = add(&store, "b", "x", 1.0, "LOW");
        model.prep_combatant(a).unwrap();
        model.prep_combatant(b.clone()).unwrap();
        store.delete(b.id).unwrap();

        // Equal scores: delta 0 never beats the draw, so "b" is picked as winner
        let err = model.battle(&store, &FixedRandom(0.5)).unwrap_err();
        assert!(matches!(
            err,
            BattleError::Store(MealError::AlreadyDeleted(_))
        ));
    }

    #[test]
    fn test_random_source_failure() {
        let store = store();
        let mut model = BattleModel::new();
        let a = add(&store, "a", "x", 1.0, "LOW");
        model.prep_combatant(a.clone()).unwrap();
        model.prep_combatant(add(&store, "b", "x", 1.0, "LOW")).unwrap();

        let err = model.battle(&store, &FailingRandom).unwrap_err();
        assert!(matches!(err, BattleError::Random(_)));
        assert_eq!(stats(&store, a.id), (0, 0));
        assert_eq!(model.combatants().len(), 2);
    }

    #[test]
    fn test_out_of_range_draw_is_rejected() {
        let store = store();
        let mut model = BattleModel::new();
        model.prep_combatant(add(&store, "a", "x", 1.0, "LOW")).unwrap();
        model.prep_combatant(add(&store, "b", "x", 1.0, "LOW")).unwrap();

        let err = model.battle(&store, &FixedRandom(1.5)).unwrap_err();
        assert!(matches!(err, BattleError::Random(_)));
    }

    #[test]
    fn test_thread_random_in_range() {
        for _ in 0..100 {
            let r = ThreadRandom.fraction().unwrap();
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn test_clear_combatants() {
        let store = store();
        let mut model = BattleModel::new();
        model.prep_combatant(add(&store, "a", "x", 1.0, "LOW")).unwrap();
        model.clear_combatants();
        assert!(model.combatants().is_empty());
    }
}
