//! Per-iteration storage for the objects each stage hands to the next.

/// Maps a loop iteration to the slot it reads and writes.
pub trait SlotPolicy {
    const NAME: &'static str;

    fn slot_count(run_iterations: usize) -> usize;
    fn slot(iteration: usize) -> usize;
}

/// Every iteration owns its own slot, so no measured call reuses an object
/// built by another.
#[derive(Clone, Copy, Debug)]
pub enum FreshPerIteration {}

/// All iterations share slot 0.
#[derive(Clone, Copy, Debug)]
pub enum SingleShared {}

impl SlotPolicy for FreshPerIteration {
    const NAME: &'static str = "fresh-per-iteration";

    fn slot_count(run_iterations: usize) -> usize {
        run_iterations
    }

    fn slot(iteration: usize) -> usize {
        iteration
    }
}

impl SlotPolicy for SingleShared {
    const NAME: &'static str = "single-shared";

    fn slot_count(_run_iterations: usize) -> usize {
        1
    }

    fn slot(_iteration: usize) -> usize {
        0
    }
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotArena<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `value` and hands back the earlier occupant, leaving it to the
    /// caller to decide when it is dropped. `Err(value)` when `slot` is out
    /// of range.
    pub fn replace(&mut self, slot: usize, value: T) -> Result<Option<T>, T> {
        match self.slots.get_mut(slot) {
            Some(entry) => Ok(entry.replace(value)),
            None => Err(value),
        }
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn filled(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}
