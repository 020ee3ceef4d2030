use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Key {
    due: Time,
    id: TaskId,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    payload: T,
}

/// Deterministic queue of deferred, cancellable tasks.
///
/// Key properties:
/// - Total ordering on `(due, id)`; tasks due at the same time run in the
///   order they were scheduled.
/// - Cancelling drops the task immediately, so storage only ever holds
///   pending work.
/// - Nothing runs on its own: the owner pops due tasks when it advances its
///   clock, so a cancelled task can never fire later.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks still waiting to run.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule_at(&mut self, due: Time, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key { due, id },
            payload,
        });
        id
    }

    pub fn schedule_after(&mut self, now: Time, delay_ms: u64, payload: T) -> TaskId {
        self.schedule_at(now.after(delay_ms), payload)
    }

    /// Returns `true` if the task was pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.entries.iter().position(|e| e.key.id == id) {
            Some(idx) => {
                self.entries.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Pops the earliest task whose due time is `<= now`.
    pub fn pop_due(&mut self, now: Time) -> Option<(TaskId, T)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.key.due <= now)
            .min_by_key(|(_, e)| e.key)
            .map(|(idx, _)| idx)?;
        let entry = self.entries.swap_remove(idx);
        Some((entry.key.id, entry.payload))
    }
}
