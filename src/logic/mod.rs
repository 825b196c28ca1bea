//! Competition logic: pure functions for scores, brackets, groups, standings and registration.

mod bracket;
mod groups;
mod progression;
mod registration;
mod score;
mod standings;

pub use bracket::{build_bracket, next_slot, MAX_BRACKET_SIZE};
pub use groups::{
    allocate_groups, group_matches, knockout_draw, round_robin_fixtures, round_robin_matches,
};
pub use progression::{edit_result, record_result};
pub use registration::{draw_order, is_duplicate_name, normalize_name, parse_participants_csv};
pub use score::{validate_score, validate_set, ValidatedScore};
pub use standings::{compute_standings, top};
