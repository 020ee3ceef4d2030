/// Generational handle: `(index, generation)`.
///
/// A slot index may be reused once its handle is released; the generation
/// changes on reuse so a stale handle never aliases the new occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

/// Hands out generational handles and tracks which ones are live.
#[derive(Debug, Default, Clone)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
    live_count: usize,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> Handle {
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.generations[slot] = self.generations[slot].wrapping_add(1);
            self.live[slot] = true;
            return Handle::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        Handle::new(index, 0)
    }

    /// Releases `handle`. Returns `false` for stale or unknown handles.
    pub fn release(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let slot = handle.index() as usize;
        self.live[slot] = false;
        self.free.push(handle.index());
        self.live_count -= 1;
        true
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        let slot = handle.index() as usize;
        self.live.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == handle.generation()
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn clear(&mut self) {
        for (index, live) in self.live.iter_mut().enumerate() {
            if *live {
                *live = false;
                self.free.push(index as u32);
            }
        }
        self.live_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, HandleAllocator};

    #[test]
    fn alloc_hands_out_distinct_handles() {
        let mut a = HandleAllocator::new();
        let h0 = a.alloc();
        let h1 = a.alloc();
        assert_ne!(h0, h1);
        assert_eq!(a.live_count(), 2);
    }

    #[test]
    fn reused_slot_bumps_generation() {
        let mut a = HandleAllocator::new();
        let h0 = a.alloc();
        assert!(a.release(h0));
        let h1 = a.alloc();
        assert_eq!(h1.index(), h0.index());
        assert_ne!(h1.generation(), h0.generation());
        assert!(!a.is_live(h0));
        assert!(a.is_live(h1));
    }

    #[test]
    fn release_rejects_stale_and_unknown() {
        let mut a = HandleAllocator::new();
        let h = a.alloc();
        assert!(a.release(h));
        assert!(!a.release(h));
        assert!(!a.release(Handle::new(42, 0)));
        assert_eq!(a.live_count(), 0);
    }

    #[test]
    fn clear_releases_everything() {
        let mut a = HandleAllocator::new();
        let h0 = a.alloc();
        let h1 = a.alloc();
        a.clear();
        assert!(!a.is_live(h0));
        assert!(!a.is_live(h1));
        assert_eq!(a.live_count(), 0);
    }
}
