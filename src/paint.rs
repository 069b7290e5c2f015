use std::time::{Duration, Instant};

use crate::models::Slot;

/// Window after a touch gesture ends during which a synthetic
/// pointer-down for the same physical gesture is ignored.
const TOUCH_COOLDOWN: Duration = Duration::from_millis(400);

/// The paint-or-erase decision captured once at gesture start and
/// replayed for every cell entered during the same gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintAction<B> {
    Set(B),
    Clear,
}

/// Where an input event came from. Touch input on most platforms also
/// synthesizes pointer events, which the session has to suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pointer,
    Touch,
}

/// A paintable grid state. The brush is an associated type so the same
/// session machine drives both the slot-selection flow (brush `()`) and
/// the rating flow (brush `Option<Rating>`, where `None` erases).
pub trait PaintSurface {
    type Brush: Copy + PartialEq;

    /// Whether the cell already holds what painting `brush` would leave.
    fn matches(&self, slot: Slot, brush: Self::Brush) -> bool;

    fn set(&mut self, slot: Slot, brush: Self::Brush);

    fn clear(&mut self, slot: Slot);

    fn apply(&mut self, slot: Slot, action: PaintAction<Self::Brush>) {
        match action {
            PaintAction::Set(brush) => self.set(slot, brush),
            PaintAction::Clear => self.clear(slot),
        }
    }
}

#[derive(Debug)]
enum State<B> {
    Idle,
    Painting {
        action: PaintAction<B>,
        via_touch: bool,
        last_slot: Slot,
    },
}

/// Two-state gesture machine turning pointer/touch event sequences into
/// surface edits. Reusable for the life of the editing view: every
/// gesture runs Idle -> Painting -> Idle.
#[derive(Debug)]
pub struct PaintSession<B> {
    state: State<B>,
    touch_ended_at: Option<Instant>,
}

impl<B: Copy + PartialEq> PaintSession<B> {
    pub fn new() -> Self {
        PaintSession {
            state: State::Idle,
            touch_ended_at: None,
        }
    }

    pub fn is_painting(&self) -> bool {
        matches!(self.state, State::Painting { .. })
    }

    /// Pointer-down / touch-start on an active cell. Captures the
    /// effective action for the whole gesture: clear if the cell already
    /// matches the brush, otherwise set to the brush. Returns false when
    /// the event is ignored (already painting, or a pointer-down that is
    /// the synthetic echo of a just-ended touch gesture).
    pub fn begin<S>(&mut self, surface: &mut S, slot: Slot, brush: B, source: Source) -> bool
    where
        S: PaintSurface<Brush = B>,
    {
        if self.is_painting() {
            return false;
        }
        if source == Source::Pointer
            && self
                .touch_ended_at
                .is_some_and(|t| t.elapsed() < TOUCH_COOLDOWN)
        {
            return false;
        }
        let action = if surface.matches(slot, brush) {
            PaintAction::Clear
        } else {
            PaintAction::Set(brush)
        };
        surface.apply(slot, action);
        self.state = State::Painting {
            action,
            via_touch: source == Source::Touch,
            last_slot: slot,
        };
        true
    }

    /// Pointer-enter / touch-move over a cell. Replays the captured
    /// action once per newly entered cell; re-entering the last-touched
    /// cell without leaving it does nothing.
    pub fn enter<S>(&mut self, surface: &mut S, slot: Slot)
    where
        S: PaintSurface<Brush = B>,
    {
        if let State::Painting { action, last_slot, .. } = &mut self.state {
            if *last_slot == slot {
                return;
            }
            surface.apply(slot, *action);
            *last_slot = slot;
        }
    }

    /// Pointer-up / touch-end / touch-cancel, valid anywhere (callers
    /// hook it at document scope so a gesture that leaves the grid still
    /// terminates). No-op in Idle; no mutation happens after this.
    pub fn end(&mut self) {
        if let State::Painting { via_touch, .. } = self.state {
            if via_touch {
                self.touch_ended_at = Some(Instant::now());
            }
            self.state = State::Idle;
        }
    }
}

impl<B: Copy + PartialEq> Default for PaintSession<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Header-level bulk toggle for one column. Reads first: if every cell
/// already matches the brush outcome the whole column is cleared,
/// otherwise every cell is set to the brush. Read and write happen in
/// one synchronous pass, so nothing can interleave between them.
pub fn toggle_column<S: PaintSurface>(surface: &mut S, column: &[Slot], brush: S::Brush) {
    let uniform = column.iter().all(|&s| surface.matches(s, brush));
    for &slot in column {
        if uniform {
            surface.clear(slot);
        } else {
            surface.set(slot, brush);
        }
    }
}
