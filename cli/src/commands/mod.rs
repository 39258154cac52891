mod battle;
mod helpers;
mod leaderboard;
mod meal;

pub(crate) use battle::cmd_battle;
pub(crate) use leaderboard::cmd_leaderboard;
pub(crate) use meal::{cmd_add, cmd_clear, cmd_delete, cmd_record, cmd_show};
