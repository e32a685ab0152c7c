// src/history/window.rs

//! Extraction of the events that are new in the current decision round.

use tracing::debug;

use crate::errors::HistoryError;
use crate::history::event::{EventType, HistoryEvent};
use crate::history::index::EventIndex;

/// The new-events window of one decision round.
#[derive(Debug, Clone, Copy)]
pub struct RoundWindow<'h> {
    /// Events strictly after the previous round's cursor, up to and
    /// including the current round's `DecisionTaskStarted` event.
    pub events: &'h [HistoryEvent],
}

impl<'h> RoundWindow<'h> {
    /// Window events minus the trailing scheduled/started pair that bounds
    /// the round.
    ///
    /// Fails if the window does not end with `DecisionTaskScheduled`
    /// immediately followed by `DecisionTaskStarted`.
    pub fn payload(&self) -> Result<&'h [HistoryEvent], HistoryError> {
        self.boundary()?;
        Ok(&self.events[..self.events.len() - 2])
    }

    /// The `DecisionTaskStarted` event that opened this round.
    pub fn started_event(&self) -> Result<&'h HistoryEvent, HistoryError> {
        let (_, started) = self.boundary()?;
        Ok(started)
    }

    fn boundary(&self) -> Result<(&'h HistoryEvent, &'h HistoryEvent), HistoryError> {
        let n = self.events.len();
        let started_event_id = self.events.last().map(|e| e.event_id).unwrap_or_default();

        if n < 2 {
            return Err(HistoryError::MissingBoundary {
                started_event_id,
                found: format!("{n} event(s) in window"),
            });
        }

        let scheduled = &self.events[n - 2];
        let started = &self.events[n - 1];
        if scheduled.event_type != EventType::DecisionTaskScheduled
            || started.event_type != EventType::DecisionTaskStarted
        {
            return Err(HistoryError::MissingBoundary {
                started_event_id,
                found: format!("{:?} then {:?}", scheduled.event_type, started.event_type),
            });
        }

        Ok((scheduled, started))
    }
}

/// Locate the new events for this round.
///
/// The window runs from just after `previous_started_event_id` through
/// `started_event_id` inclusive. When there is no previous cursor, or it is
/// not present in the history (first round, truncated history), the window
/// starts at the beginning of history.
pub fn window<'h>(
    index: &EventIndex<'h>,
    started_event_id: u64,
    previous_started_event_id: Option<u64>,
) -> Result<RoundWindow<'h>, HistoryError> {
    let current = index
        .position(started_event_id)
        .ok_or(HistoryError::MissingEvent {
            event_id: started_event_id,
        })?;

    let start = previous_started_event_id
        .and_then(|id| index.position(id))
        .map(|pos| pos + 1)
        .unwrap_or(0);

    // A previous cursor after the current one would be a backend bug; fall
    // back to an empty window rather than panicking on the slice.
    let start = start.min(current + 1);
    let events = &index.events()[start..=current];

    debug!(
        count = events.len(),
        from_index = start,
        to_index = current,
        first_event_id = events.first().map(|e| e.event_id),
        last_event_id = started_event_id,
        "processing new events"
    );

    Ok(RoundWindow { events })
}
