//! Registration: participant name rules, CSV import and draw ordering.

use crate::models::{CompetitionError, DrawOrder, NewParticipant, Participant, ParticipantId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::Read;

/// Trim a display name; names must not be empty.
pub fn normalize_name(name: &str) -> Result<String, CompetitionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CompetitionError::EmptyParticipantName);
    }
    Ok(trimmed.to_string())
}

/// Names are unique per competition, case-insensitively.
pub fn is_duplicate_name<'a>(name: &str, existing: impl IntoIterator<Item = &'a str>) -> bool {
    existing.into_iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Parse a participant list with a `name` column and an optional `seed` column.
///
/// Blank seeds are unseeded. The whole file is rejected on the first bad row.
pub fn parse_participants_csv<R: Read>(reader: R) -> Result<Vec<NewParticipant>, CompetitionError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (line, record) in rdr.deserialize::<NewParticipant>().enumerate() {
        let mut entry = record
            .map_err(|e| CompetitionError::InvalidImport(format!("row {}: {}", line + 1, e)))?;
        entry.name = normalize_name(&entry.name)
            .map_err(|_| CompetitionError::InvalidImport(format!("row {}: empty name", line + 1)))?;
        out.push(entry);
    }
    if out.is_empty() {
        return Err(CompetitionError::InvalidImport("no participants in file".to_string()));
    }
    Ok(out)
}

/// Order participants into the draw.
///
/// Seeded entrants come first by ascending seed, then unseeded entrants by registration
/// order, or shuffled with a reproducible RNG for `DrawOrder::Random`.
pub fn draw_order(participants: &[Participant], order: DrawOrder) -> Vec<ParticipantId> {
    let mut seeded: Vec<&Participant> = participants.iter().filter(|p| p.seed.is_some()).collect();
    seeded.sort_by_key(|p| (p.seed, p.registration_index));

    let mut unseeded: Vec<&Participant> = participants.iter().filter(|p| p.seed.is_none()).collect();
    unseeded.sort_by_key(|p| p.registration_index);
    if let DrawOrder::Random { seed } = order {
        let mut rng = StdRng::seed_from_u64(seed);
        unseeded.shuffle(&mut rng);
    }

    seeded.into_iter().chain(unseeded).map(|p| p.id).collect()
}
