// src/history/index.rs

//! Lookup tables built once per decision round over the full history.

use std::collections::HashMap;

use tracing::trace;

use crate::errors::HistoryError;
use crate::history::event::{EventType, HistoryEvent};

/// O(1) lookup of events by identifier.
#[derive(Debug)]
pub struct EventIndex<'h> {
    events: &'h [HistoryEvent],
    by_id: HashMap<u64, usize>,
}

impl<'h> EventIndex<'h> {
    pub fn new(events: &'h [HistoryEvent]) -> Self {
        let by_id = events
            .iter()
            .enumerate()
            .map(|(pos, event)| (event.event_id, pos))
            .collect();
        Self { events, by_id }
    }

    /// The full history this index was built from.
    pub fn events(&self) -> &'h [HistoryEvent] {
        self.events
    }

    /// Position of an event in the history, if present.
    pub fn position(&self, event_id: u64) -> Option<usize> {
        self.by_id.get(&event_id).copied()
    }

    pub fn get(&self, event_id: u64) -> Option<&'h HistoryEvent> {
        self.position(event_id).map(|pos| &self.events[pos])
    }

    /// Like [`EventIndex::get`], but a missing event is a protocol error.
    pub fn require(&self, event_id: u64) -> Result<&'h HistoryEvent, HistoryError> {
        self.get(event_id)
            .ok_or(HistoryError::MissingEvent { event_id })
    }
}

/// Map every activity event to the identifier of the `ActivityTaskScheduled`
/// event of the attempt it belongs to.
///
/// Scheduling events map to themselves; started/completed/failed/timed-out/
/// canceled events are resolved through their `scheduledEventId`. The task id
/// only lives on the scheduling event, so this is how later events find their
/// task.
pub fn link_outcomes(index: &EventIndex<'_>) -> Result<HashMap<u64, u64>, HistoryError> {
    let mut links = HashMap::new();

    for event in index.events() {
        if !event.event_type.is_activity_outcome() {
            continue;
        }

        let reference = event.scheduled_event_id()?;
        let scheduled_event_id = match index.get(reference) {
            Some(target) if target.event_type == EventType::ActivityTaskScheduled => reference,
            _ => {
                return Err(HistoryError::UnresolvedReference {
                    event_id: event.event_id,
                    reference,
                });
            }
        };

        trace!(event_id = event.event_id, scheduled_event_id, "linked activity event");
        links.insert(event.event_id, scheduled_event_id);
    }

    Ok(links)
}

/// Look up the scheduling event of an activity event in `links`.
///
/// A miss reports the reference the event itself carries.
pub fn linked_scheduled_event(
    links: &HashMap<u64, u64>,
    event: &HistoryEvent,
) -> Result<u64, HistoryError> {
    match links.get(&event.event_id) {
        Some(id) => Ok(*id),
        None => Err(HistoryError::UnresolvedReference {
            event_id: event.event_id,
            reference: event.scheduled_event_id()?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::event::{ActivityTaskOutcomeAttributes, ActivityTaskScheduledAttributes};
    use crate::types::ActivityType;

    fn scheduled(id: u64, activity_id: &str) -> HistoryEvent {
        let mut event = HistoryEvent::new(id, EventType::ActivityTaskScheduled);
        event.activity_task_scheduled_event_attributes = Some(ActivityTaskScheduledAttributes {
            activity_id: activity_id.to_string(),
            activity_type: ActivityType::new("work", "1"),
            input: None,
            decision_task_completed_event_id: 0,
        });
        event
    }

    fn completed(id: u64, scheduled_event_id: u64) -> HistoryEvent {
        let mut event = HistoryEvent::new(id, EventType::ActivityTaskCompleted);
        event.activity_task_completed_event_attributes = Some(ActivityTaskOutcomeAttributes {
            scheduled_event_id,
            ..Default::default()
        });
        event
    }

    #[test]
    fn links_outcomes_back_to_scheduling_event() {
        let events = vec![
            HistoryEvent::new(1, EventType::WorkflowExecutionStarted),
            scheduled(2, "A"),
            completed(3, 2),
        ];
        let index = EventIndex::new(&events);
        let links = link_outcomes(&index).unwrap();

        assert_eq!(links.get(&2), Some(&2));
        assert_eq!(links.get(&3), Some(&2));
        assert_eq!(links.get(&1), None);
    }

    #[test]
    fn dangling_reference_is_a_protocol_error() {
        let events = vec![scheduled(1, "A"), completed(2, 7)];
        let index = EventIndex::new(&events);

        assert_eq!(
            link_outcomes(&index).unwrap_err(),
            HistoryError::UnresolvedReference {
                event_id: 2,
                reference: 7
            }
        );
    }

    #[test]
    fn reference_to_non_scheduling_event_is_rejected() {
        let events = vec![
            HistoryEvent::new(1, EventType::WorkflowExecutionStarted),
            completed(2, 1),
        ];
        let index = EventIndex::new(&events);
        assert!(matches!(
            link_outcomes(&index),
            Err(HistoryError::UnresolvedReference { event_id: 2, reference: 1 })
        ));
    }

    #[test]
    fn unlinked_event_reports_its_own_back_reference() {
        let events = vec![scheduled(2, "A"), completed(3, 2)];
        let index = EventIndex::new(&events);
        let links = link_outcomes(&index).unwrap();
        assert_eq!(linked_scheduled_event(&links, &events[1]), Ok(2));

        let stray = completed(9, 5);
        assert_eq!(
            linked_scheduled_event(&links, &stray).unwrap_err(),
            HistoryError::UnresolvedReference {
                event_id: 9,
                reference: 5
            }
        );
    }

    #[test]
    fn require_reports_missing_ids() {
        let events = vec![HistoryEvent::new(1, EventType::WorkflowExecutionStarted)];
        let index = EventIndex::new(&events);
        assert!(index.require(1).is_ok());
        assert_eq!(
            index.require(4).unwrap_err(),
            HistoryError::MissingEvent { event_id: 4 }
        );
    }
}
