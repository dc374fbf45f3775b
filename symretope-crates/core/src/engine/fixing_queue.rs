use enumset::EnumSet;

use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;

/// Returned when a fixing is enqueued while its converse is still waiting in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QueuedConverse {
    /// The power which caused the converse fixing to be enqueued.
    pub(crate) power: u64,
}

/// The fixings which have been derived but not yet applied, together with the power of the
/// permutation which derived them.
///
/// The queue is processed last-in first-out.
#[derive(Clone, Debug, Default)]
pub(crate) struct FixingQueue {
    queued: Vec<EnumSet<BinaryValue>>,
    causes: Vec<u64>,
    stack: Vec<Fixing>,
}

impl FixingQueue {
    pub(crate) fn ensure_capacity(&mut self, num_entries: usize) {
        if self.queued.len() < num_entries {
            self.queued.resize(num_entries, EnumSet::empty());
            self.causes.resize(num_entries, 0);
        }
    }

    pub(crate) fn enqueue(&mut self, fixing: Fixing, power: u64) -> Result<(), QueuedConverse> {
        let queued = &mut self.queued[fixing.entry];
        if queued.contains(fixing.value) {
            return Ok(());
        }
        if !queued.is_empty() {
            return Err(QueuedConverse {
                power: self.causes[fixing.entry],
            });
        }

        let _ = queued.insert(fixing.value);
        self.causes[fixing.entry] = power;
        self.stack.push(fixing);
        Ok(())
    }

    /// Removes the most recently enqueued fixing, together with the power that caused it.
    pub(crate) fn drain_one(&mut self) -> Option<(Fixing, u64)> {
        let fixing = self.stack.pop()?;
        let _ = self.queued[fixing.entry].remove(fixing.value);
        Some((fixing, self.causes[fixing.entry]))
    }

    pub(crate) fn discard_pending(&mut self) {
        while self.drain_one().is_some() {}
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.stack.is_empty() && self.queued.iter().all(|queued| queued.is_empty())
    }
}
