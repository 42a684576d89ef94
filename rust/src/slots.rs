//! Slot allocation for string task keys.
//!
//! [`TaskDispatcher`] addresses tasks by dense slot numbers. `SlotTable`
//! binds arbitrary keys to free slots and recycles a slot once every entry
//! queued under its key has been dispatched.

use rustc_hash::FxHashMap;

use crate::config::DispatchConfig;
use crate::counter::Mass;
use crate::dispatcher::{Priority, TaskDispatcher, TaskId};
use crate::error::{KernelError, KernelResult};

/// Bidirectional key <-> slot map over slots `1..=capacity`.
#[derive(Debug, Clone)]
pub struct SlotTable {
    to_slot: FxHashMap<String, TaskId>,
    /// Key bound to each slot. Index 0 is unused.
    from_slot: Vec<Option<String>>,
    /// Released slots, reused most recent first.
    free: Vec<TaskId>,
    /// Next never-used slot.
    next_fresh: TaskId,
}

impl SlotTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_slot: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_slot: vec![None; capacity + 1],
            free: Vec::new(),
            next_fresh: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.from_slot.len() - 1
    }

    /// Slot bound to `key`, binding a free slot if the key is new.
    ///
    /// # Errors
    /// * `CapacityExhausted` if the key is new and every slot is bound
    pub fn assign(&mut self, key: &str) -> KernelResult<TaskId> {
        if let Some(&slot) = self.to_slot.get(key) {
            return Ok(slot);
        }
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None if self.next_fresh <= self.capacity() => {
                self.next_fresh += 1;
                self.next_fresh - 1
            }
            None => return Err(KernelError::CapacityExhausted(self.capacity())),
        };
        self.to_slot.insert(key.to_string(), slot);
        self.from_slot[slot] = Some(key.to_string());
        Ok(slot)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<TaskId> {
        self.to_slot.get(key).copied()
    }

    #[inline]
    pub fn resolve(&self, slot: TaskId) -> Option<&str> {
        self.from_slot.get(slot)?.as_deref()
    }

    /// Unbind `slot`, returning the key it held.
    pub fn release(&mut self, slot: TaskId) -> Option<String> {
        let key = self.from_slot.get_mut(slot)?.take()?;
        self.to_slot.remove(&key);
        self.free.push(slot);
        Some(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.to_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_slot.is_empty()
    }
}

/// [`TaskDispatcher`] addressed by string keys instead of slot numbers.
#[derive(Debug, Clone)]
pub struct KeyedDispatcher {
    dispatcher: TaskDispatcher,
    slots: SlotTable,
}

impl KeyedDispatcher {
    /// Create a dispatcher holding at most `capacity` distinct keys at once.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(capacity, DispatchConfig::default())
    }

    pub fn with_config(capacity: usize, config: DispatchConfig) -> Self {
        Self {
            dispatcher: TaskDispatcher::with_config(capacity, config),
            slots: SlotTable::with_capacity(capacity),
        }
    }

    /// Queue a task under `key`, returning the slot it occupies.
    ///
    /// # Errors
    /// * `CapacityExhausted` if `key` is new and no slot is free
    pub fn add_task(&mut self, key: &str, priority: Priority) -> KernelResult<TaskId> {
        let slot = self.slots.assign(key)?;
        self.dispatcher.add_task(slot, priority)?;
        Ok(slot)
    }

    /// Remove and return the key of the highest-priority task. The key's
    /// slot is freed when its last queued entry leaves.
    pub fn dispatch_next_task(&mut self) -> Option<String> {
        let slot = self.dispatcher.dispatch_next_task()?;
        if matches!(self.dispatcher.queued_entries(slot), Ok(0)) {
            self.slots.release(slot)
        } else {
            self.slots.resolve(slot).map(str::to_string)
        }
    }

    /// Sum of the priorities still queued under `key`.
    pub fn queued_priority(&self, key: &str) -> Option<Mass> {
        let slot = self.slots.get(key)?;
        self.dispatcher.queued_priority(slot).ok()
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn dispatcher(&self) -> &TaskDispatcher {
        &self.dispatcher
    }

    pub fn len(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatcher.is_empty()
    }
}
