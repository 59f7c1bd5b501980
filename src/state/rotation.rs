use chrono::{DateTime, TimeDelta, Utc};

use crate::effects::compositor::Effect;
use crate::foundation::error::{ReelError, ReelResult};
use crate::sources::music::MusicAsset;
use crate::sources::quotes::Quote;
use crate::state::store::RotationState;

/// Length of one rotation cycle.
pub const RESET_PERIOD: TimeDelta = TimeDelta::days(7);

/// Round-robin pick: an out-of-range `index` restarts at 0.
///
/// Returns the chosen item and the cursor to persist for the following run.
pub fn select_next<T>(pool: &[T], index: usize) -> ReelResult<(&T, usize)> {
    if pool.is_empty() {
        return Err(ReelError::empty_pool("cannot select from an empty pool"));
    }
    let index = if index >= pool.len() { 0 } else { index };
    Ok((&pool[index], (index + 1) % pool.len()))
}

/// Restart the quote and music cycles once [`RESET_PERIOD`] has elapsed.
///
/// The effect cursor is left alone. Returns whether a reset happened; the caller persists it.
pub fn check_weekly_reset(state: &mut RotationState, now: DateTime<Utc>, enabled: bool) -> bool {
    if !enabled || now.signed_duration_since(state.last_reset) < RESET_PERIOD {
        return false;
    }
    state.quote_index = 0;
    state.music_index = 0;
    state.last_reset = now;
    true
}

/// Items chosen for one run, plus the state to commit once the run succeeds.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Row position of the chosen quote in the table.
    pub quote_row: usize,
    /// Chosen quote.
    pub quote: Quote,
    /// Chosen music track.
    pub music: MusicAsset,
    /// Chosen effect.
    pub effect: Effect,
    next: RotationState,
}

impl Selection {
    /// Pick the next quote, track and effect without touching `state`.
    pub fn compute(
        state: &RotationState,
        quotes: &[Quote],
        music: &[MusicAsset],
        effects: &[Effect],
    ) -> ReelResult<Self> {
        let quote_row = if state.quote_index >= quotes.len() {
            0
        } else {
            state.quote_index
        };
        let (quote, next_quote) = select_next(quotes, state.quote_index)
            .map_err(|_| ReelError::empty_pool("no quotes available"))?;
        let (track, next_music) = select_next(music, state.music_index)
            .map_err(|_| ReelError::empty_pool("no music tracks available"))?;
        let (effect, next_effect) = select_next(effects, state.effect_index)
            .map_err(|_| ReelError::empty_pool("no effects configured"))?;

        Ok(Self {
            quote_row,
            quote: quote.clone(),
            music: track.clone(),
            effect: *effect,
            next: RotationState {
                quote_index: next_quote,
                music_index: next_music,
                effect_index: next_effect,
                last_reset: state.last_reset,
            },
        })
    }

    /// State to persist after success.
    ///
    /// When the quote row was removed from the table the following rows shift up, so the quote
    /// cursor stays on the same position instead of advancing.
    pub fn next_state(&self, quote_row_removed: bool) -> RotationState {
        let mut next = self.next.clone();
        if quote_row_removed {
            next.quote_index = self.quote_row;
        }
        next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/rotation.rs"]
mod tests;
