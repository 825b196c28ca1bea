//! Group of a group-stage competition.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Fixed membership, created once when the group stage starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub index: usize,
    pub name: String,
    /// Members in draw order.
    pub members: Vec<ParticipantId>,
    /// How many top-ranked members proceed to the knockout.
    pub advancement_count: usize,
}

/// "Group A".."Group Z", then "Group 27" onwards.
pub fn group_name(index: usize) -> String {
    if index < 26 {
        format!("Group {}", (b'A' + index as u8) as char)
    } else {
        format!("Group {}", index + 1)
    }
}

/// How the field is split: by number of groups or by target group size.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSizing {
    Count(usize),
    Size(usize),
}

impl GroupSizing {
    /// Number of groups for `participants` entrants.
    pub fn group_count(self, participants: usize) -> usize {
        match self {
            GroupSizing::Count(n) => n,
            GroupSizing::Size(0) => 0,
            GroupSizing::Size(s) => participants.div_ceil(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_letters_then_numbers() {
        assert_eq!(group_name(0), "Group A");
        assert_eq!(group_name(25), "Group Z");
        assert_eq!(group_name(26), "Group 27");
    }

    #[test]
    fn size_rounds_group_count_up() {
        assert_eq!(GroupSizing::Size(4).group_count(10), 3);
        assert_eq!(GroupSizing::Size(4).group_count(8), 2);
        assert_eq!(GroupSizing::Count(3).group_count(10), 3);
    }
}
