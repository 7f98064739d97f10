//! Event replay: fold deltas onto a state with clamping.

use persona_core::errors::PersonaResult;
use persona_core::models::{DimensionSchema, StateEvent, StateVector};

use crate::cancellation::Cancellation;

/// Replay a sequence of events onto an initial state, in slice order.
pub fn replay_events(
    schema: &DimensionSchema,
    events: &[StateEvent],
    initial: StateVector,
) -> StateVector {
    let mut state = initial;
    for event in events {
        apply_event(schema, &mut state, event);
    }
    state
}

/// Apply a single event: `state[d] = clamp(state[d] + delta[d], lower, max)`.
pub fn apply_event(schema: &DimensionSchema, state: &mut StateVector, event: &StateEvent) {
    schema.apply_delta(state, &event.delta);
}

/// Replay that polls `cancel` every `check_interval` events.
pub fn replay_cancellable(
    schema: &DimensionSchema,
    events: &[StateEvent],
    initial: StateVector,
    cancel: &Cancellation,
    check_interval: usize,
) -> PersonaResult<StateVector> {
    let interval = check_interval.max(1);
    let mut state = initial;
    for (i, event) in events.iter().enumerate() {
        if i % interval == 0 {
            cancel.check("replay")?;
        }
        apply_event(schema, &mut state, event);
    }
    Ok(state)
}
