//! The seam between the event stream and snapshot construction

use pivot_protocol::BattleEvent;

use crate::state::BattleState;

/// Folds battle events into a running state and produces snapshots on demand.
///
/// Implementations must be `Clone`: the environment applies each batch of
/// events to a copy and only keeps it once the batch completes, so a failed
/// or cancelled read never leaves a half-applied builder behind.
pub trait StateBuilder: Clone {
    /// Fold one event into the running state
    fn apply(&mut self, event: &BattleEvent);

    /// Build an immutable snapshot of the current state
    fn snapshot(&self) -> BattleState;

    /// Fold a sequence of events in order
    fn apply_all<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a BattleEvent>,
    {
        for event in events {
            self.apply(event);
        }
    }
}
