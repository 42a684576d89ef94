//! Priority task dispatcher backed by an [`IndexedCounter`].
//!
//! Tasks are queued as `(priority, task_id)` entries in a max-heap. The
//! counter tracks the queued priority mass per task slot so callers can ask
//! aggregate questions (total mass, mass at or below a slot) in O(log n).
//!
//! Dispatch removes exactly the dispatched entry's priority from its slot.
//! Clearing the slot's prefix sum instead would also wipe the mass of every
//! lower slot, so the counter is kept exact and every slot returns to 0
//! once all of its entries have been dispatched.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::DispatchConfig;
use crate::counter::{IndexedCounter, Mass};
use crate::error::{checked_size, KernelError, KernelResult};
use crate::{log_events, log_steps};

/// Task slot in `[1, capacity]`.
pub type TaskId = usize;

/// Task priority. Larger values dispatch first.
pub type Priority = i64;

/// Heap entry. Ordered so `BinaryHeap` pops the highest priority, then the
/// earliest queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueuedTask {
    priority: Priority,
    seq: u64,
    task_id: TaskId,
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-priority task queue with per-slot priority accounting.
#[derive(Clone, Debug)]
pub struct TaskDispatcher {
    queue: BinaryHeap<QueuedTask>,
    counter: IndexedCounter,
    /// Queued priority per slot, mirrors `counter.point_value`. Index 0 unused.
    slot_priority: Vec<Mass>,
    /// Number of queued entries per slot. Index 0 unused.
    slot_entries: Vec<usize>,
    next_seq: u64,
    config: DispatchConfig,
}

impl TaskDispatcher {
    /// Create a dispatcher accepting task ids `1..=capacity`.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(capacity, DispatchConfig::default())
    }

    pub fn with_config(capacity: usize, config: DispatchConfig) -> Self {
        Self {
            queue: BinaryHeap::new(),
            counter: IndexedCounter::new(capacity),
            slot_priority: vec![0; capacity + 1],
            slot_entries: vec![0; capacity + 1],
            next_seq: 0,
            config,
        }
    }

    /// Create a dispatcher from a signed capacity.
    pub fn checked_new(capacity: i64, config: DispatchConfig) -> KernelResult<Self> {
        Ok(Self::with_config(checked_size(capacity)?, config))
    }

    pub fn capacity(&self) -> usize {
        self.counter.len()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn check_task(&self, task_id: TaskId) -> KernelResult<()> {
        if task_id == 0 || task_id > self.capacity() {
            return Err(KernelError::out_of_range(task_id, self.capacity()));
        }
        Ok(())
    }

    /// Queue a task. Adding the same id again queues a second, independent
    /// entry whose priority is added to the same slot.
    ///
    /// # Errors
    /// * `OutOfRange` unless `1 <= task_id <= capacity()`
    pub fn add_task(&mut self, task_id: TaskId, priority: Priority) -> KernelResult<()> {
        self.check_task(task_id)?;
        self.queue.push(QueuedTask {
            priority,
            seq: self.next_seq,
            task_id,
        });
        self.next_seq += 1;
        self.counter.apply(task_id, priority);
        self.slot_priority[task_id] += Mass::from(priority);
        self.slot_entries[task_id] += 1;
        log_steps!(
            self.config.verbosity,
            "Queue task {} (priority {}, {} queued)",
            task_id,
            priority,
            self.queue.len()
        );
        Ok(())
    }

    /// Remove and return the highest-priority task, or `None` if the queue
    /// is empty. Equal priorities dispatch in the order they were added.
    pub fn dispatch_next_task(&mut self) -> Option<TaskId> {
        self.dispatch_next_entry().map(|(task_id, _)| task_id)
    }

    /// Like [`dispatch_next_task`](Self::dispatch_next_task), also returning
    /// the dispatched entry's priority.
    pub fn dispatch_next_entry(&mut self) -> Option<(TaskId, Priority)> {
        let task = self.queue.pop()?;
        self.counter.apply(task.task_id, -task.priority);
        self.slot_priority[task.task_id] -= Mass::from(task.priority);
        self.slot_entries[task.task_id] -= 1;
        log_events!(
            self.config.verbosity,
            "Dispatch task {} (priority {}, {} remaining)",
            task.task_id,
            task.priority,
            self.queue.len()
        );
        Some((task.task_id, task.priority))
    }

    /// The entry `dispatch_next_task` would return, without removing it.
    pub fn peek(&self) -> Option<(TaskId, Priority)> {
        self.queue.peek().map(|t| (t.task_id, t.priority))
    }

    /// Dispatch every queued task in priority order.
    pub fn drain(&mut self) -> impl Iterator<Item = TaskId> + '_ {
        std::iter::from_fn(move || self.dispatch_next_task())
    }

    /// Sum of the priorities still queued for `task_id`.
    pub fn queued_priority(&self, task_id: TaskId) -> KernelResult<Mass> {
        self.check_task(task_id)?;
        Ok(self.slot_priority[task_id])
    }

    /// Number of entries still queued for `task_id`.
    pub fn queued_entries(&self, task_id: TaskId) -> KernelResult<usize> {
        self.check_task(task_id)?;
        Ok(self.slot_entries[task_id])
    }

    /// Sum of every queued priority.
    pub fn queued_mass(&self) -> Mass {
        self.counter.total()
    }

    /// Sum of queued priorities over slots `1..=task_id`.
    pub fn mass_through(&self, task_id: TaskId) -> KernelResult<Mass> {
        self.counter.query(task_id)
    }

    /// Read-only view of the priority counter.
    pub fn counter(&self) -> &IndexedCounter {
        &self.counter
    }
}
