use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::{Rating, Slot, Vote};

/// One voter's effective stance on one slot, for the detail sidebar.
/// `rating: None` means the voter can't make it.
#[derive(Debug, Clone, Serialize)]
pub struct VoterRating {
    pub voter_name: String,
    pub rating: Option<Rating>,
}

/// Consensus statistics for one candidate slot.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAggregate {
    pub cant_count: usize,
    pub can_make_count: usize,
    /// Mean rating weight over voters who can make it; 0 when nobody can.
    pub avg_goodness: f64,
    pub all_can_make: bool,
    /// Per-voter breakdown in vote submission order.
    pub voter_ratings: Vec<VoterRating>,
}

/// Reduces the active vote set to per-slot consensus statistics. Pure
/// and total over `slots`: every candidate slot gets an entry, rated or
/// not. Recomputed in full whenever the vote set or the hidden-voter
/// filter changes; there is no incremental state to drift.
pub fn aggregate(
    slots: &[Slot],
    votes: &[Vote],
    hidden_voters: &HashSet<String>,
) -> BTreeMap<Slot, SlotAggregate> {
    let active: Vec<&Vote> = votes
        .iter()
        .filter(|v| !hidden_voters.contains(&v.voter_name))
        .collect();

    let mut result = BTreeMap::new();
    for &slot in slots {
        let mut voter_ratings = Vec::with_capacity(active.len());
        let mut total_goodness: u32 = 0;
        let mut can_make_count = 0;
        let mut cant_count = 0;

        for vote in &active {
            let rating = vote.rating_for(slot);
            match rating {
                Some(r) => {
                    can_make_count += 1;
                    total_goodness += r.weight();
                }
                None => cant_count += 1,
            }
            voter_ratings.push(VoterRating {
                voter_name: vote.voter_name.clone(),
                rating,
            });
        }

        let avg_goodness = if can_make_count > 0 {
            f64::from(total_goodness) / can_make_count as f64
        } else {
            0.0
        };

        result.insert(
            slot,
            SlotAggregate {
                cant_count,
                can_make_count,
                avg_goodness,
                all_can_make: cant_count == 0 && !active.is_empty(),
                voter_ratings,
            },
        );
    }
    result
}
