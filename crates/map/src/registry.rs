use std::collections::BTreeMap;

use foundation::ids::StationId;

/// A live graphical object owned by the map, with the descriptor it was
/// last drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<H, D> {
    pub handle: H,
    pub descriptor: D,
}

/// What has to happen to bring a registry in line with a desired state.
///
/// Every list is in ascending station id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Present in the registry but not desired.
    pub stale: Vec<StationId>,
    /// Desired but not yet present.
    pub added: Vec<StationId>,
    /// Present with a different descriptor.
    pub changed: Vec<StationId>,
    pub unchanged: usize,
}

/// Station-keyed registry of owned handles. At most one handle per id.
#[derive(Debug, Clone)]
pub struct Registry<H, D> {
    entries: BTreeMap<StationId, Entry<H, D>>,
}

impl<H, D> Default for Registry<H, D> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<H: Copy, D: PartialEq> Registry<H, D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: StationId) -> Option<&Entry<H, D>> {
        self.entries.get(&id)
    }

    pub fn handle(&self, id: StationId) -> Option<H> {
        self.entries.get(&id).map(|e| e.handle)
    }

    pub fn ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StationId, &Entry<H, D>)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Inserts or replaces the entry for `id`, returning the previous one.
    pub fn insert(&mut self, id: StationId, handle: H, descriptor: D) -> Option<Entry<H, D>> {
        self.entries.insert(id, Entry { handle, descriptor })
    }

    pub fn set_descriptor(&mut self, id: StationId, descriptor: D) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.descriptor = descriptor;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: StationId) -> Option<Entry<H, D>> {
        self.entries.remove(&id)
    }

    /// Removes every entry and returns them in id order.
    pub fn take_all(&mut self) -> Vec<(StationId, Entry<H, D>)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    pub fn plan(&self, desired: &BTreeMap<StationId, D>) -> Plan {
        let mut plan = Plan::default();
        for id in self.entries.keys() {
            if !desired.contains_key(id) {
                plan.stale.push(*id);
            }
        }
        for (id, descriptor) in desired {
            match self.entries.get(id) {
                None => plan.added.push(*id),
                Some(entry) if entry.descriptor == *descriptor => plan.unchanged += 1,
                Some(_) => plan.changed.push(*id),
            }
        }
        plan
    }
}
