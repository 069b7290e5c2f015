use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::grid::HOURS;
use crate::models::{Rating, Slot, SlotRating};
use crate::paint::PaintSurface;

/// Session-local slot set for the authoring flow. Mutated only through
/// the paint session and the two bulk operations; everything else reads.
/// BTreeSet keeps iteration ascending, so serialization is canonical.
#[derive(Debug, Default)]
pub struct SlotSelection {
    slots: BTreeSet<Slot>,
}

impl SlotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.slots.contains(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Selects every slot of the full grid spanned by `dates`.
    pub fn select_all(&mut self, dates: &[NaiveDate]) {
        for &date in dates {
            for &hour in &HOURS {
                self.slots.insert(Slot::new(date, hour));
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    /// Ascending slot list, the form submitted to storage.
    pub fn to_sorted(&self) -> Vec<Slot> {
        self.slots.iter().copied().collect()
    }
}

impl PaintSurface for SlotSelection {
    type Brush = ();

    fn matches(&self, slot: Slot, _brush: ()) -> bool {
        self.slots.contains(&slot)
    }

    fn set(&mut self, slot: Slot, _brush: ()) {
        self.slots.insert(slot);
    }

    fn clear(&mut self, slot: Slot) {
        self.slots.remove(&slot);
    }
}

/// Session-local slot -> rating mapping for the voting flow. A missing
/// entry means "can't make it". The brush is `Option<Rating>`, with
/// `None` acting as the eraser.
#[derive(Debug, Default)]
pub struct RatingSheet {
    ratings: BTreeMap<Slot, Rating>,
}

impl RatingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<Rating> {
        self.ratings.get(&slot).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.ratings.clear();
    }

    /// Ascending (slot, rating) list for submission. Unavailable slots
    /// are simply absent.
    pub fn to_ratings(&self) -> Vec<SlotRating> {
        self.ratings
            .iter()
            .map(|(&slot, &rating)| SlotRating { slot, rating })
            .collect()
    }
}

impl PaintSurface for RatingSheet {
    type Brush = Option<Rating>;

    fn matches(&self, slot: Slot, brush: Option<Rating>) -> bool {
        self.get(slot) == brush
    }

    fn set(&mut self, slot: Slot, brush: Option<Rating>) {
        match brush {
            Some(rating) => {
                self.ratings.insert(slot, rating);
            }
            None => {
                self.ratings.remove(&slot);
            }
        }
    }

    fn clear(&mut self, slot: Slot) {
        self.ratings.remove(&slot);
    }
}
