use std::fmt;

use serde::{Serialize, Serializer};

use crate::aggregate::SlotAggregate;
use crate::models::Rating;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Cells with no data, or where not everyone can make it.
pub const NEUTRAL: Rgb = Rgb::new(209, 213, 219);

pub const GREAT: Rgb = Rgb::new(34, 197, 94);
pub const GOOD: Rgb = Rgb::new(101, 163, 13);
pub const FINE: Rgb = Rgb::new(139, 139, 59);

pub fn rating_color(rating: Rating) -> Rgb {
    match rating {
        Rating::Great => GREAT,
        Rating::Good => GOOD,
        Rating::Fine => FINE,
    }
}

/// Cell color when a single voter is highlighted: that voter's own
/// rating anchor, ignoring aggregation entirely.
pub fn voter_color(rating: Option<Rating>) -> Rgb {
    rating.map_or(NEUTRAL, rating_color)
}

fn blend_component(low: u8, high: u8, t: f64) -> u8 {
    (f64::from(low) + (f64::from(high) - f64::from(low)) * t).round() as u8
}

/// Heatmap color for one slot's consensus. Neutral unless every active
/// voter can make it (which also covers zero active voters), otherwise
/// a linear blend from the fine anchor (avg 1) to the great anchor
/// (avg 3).
pub fn consensus_color(agg: &SlotAggregate) -> Rgb {
    if !agg.all_can_make {
        return NEUTRAL;
    }
    let t = ((agg.avg_goodness - 1.0) / 2.0).clamp(0.0, 1.0);
    Rgb::new(
        blend_component(FINE.r, GREAT.r, t),
        blend_component(FINE.g, GREAT.g, t),
        blend_component(FINE.b, GREAT.b, t),
    )
}

/// How many conflict markers to draw on a rendered cell: the number of
/// active voters who can't make it, shown only when the cell is in
/// conflict.
pub fn indicator_count(agg: &SlotAggregate) -> usize {
    if agg.all_can_make { 0 } else { agg.cant_count }
}
