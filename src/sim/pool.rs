//! Fixed-Capacity Entity Pools
//!
//! Every mobile actor kind (captives, vehicles, shells, explosion puffs)
//! lives in a fixed array of slots reused via allocate/free rather than
//! heap allocation. A slot is free in exactly one state value per kind;
//! `allocate` is a linear scan for the first free slot, so iteration order
//! is deterministic and the lower index always wins ties. Saturation is a
//! normal outcome: callers get `None` and simply retry on a later tick.

/// A pool slot. `reset` must return the slot to its one free state.
pub trait Slot: Default {
    fn is_free(&self) -> bool;

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed array of `N` slots of one actor kind.
#[derive(Debug)]
pub struct Pool<T: Slot, const N: usize> {
    slots: [T; N],
}

impl<T: Slot, const N: usize> Pool<T, N> {
    pub fn new() -> Self {
        Pool {
            slots: std::array::from_fn(|_| T::default()),
        }
    }

    /// First free slot index, lowest first. `None` when saturated.
    pub fn allocate(&mut self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_free())
    }

    pub fn is_alive(&self, idx: usize) -> bool {
        idx < N && !self.slots[idx].is_free()
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Return a slot to the pool. Freeing an already-free slot is a no-op.
    pub fn free(&mut self, idx: usize) {
        self.slots[idx].reset();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }

    /// Deterministic left-to-right pass over live slots.
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| !s.is_free())
    }

    pub fn iter_alive_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| !s.is_free())
    }
}

impl<T: Slot, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Slot, const N: usize> std::ops::Index<usize> for Pool<T, N> {
    type Output = T;
    fn index(&self, idx: usize) -> &T {
        &self.slots[idx]
    }
}

impl<T: Slot, const N: usize> std::ops::IndexMut<usize> for Pool<T, N> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.slots[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Dummy {
        live: bool,
    }

    impl Slot for Dummy {
        fn is_free(&self) -> bool {
            !self.live
        }
    }

    #[test]
    fn test_allocate_lowest_index_first() {
        let mut pool: Pool<Dummy, 4> = Pool::new();
        let a = pool.allocate().unwrap();
        assert_eq!(a, 0);
        pool[a].live = true;

        let b = pool.allocate().unwrap();
        assert_eq!(b, 1);
        pool[b].live = true;

        // Free the lower slot; the next allocation reuses it, not slot 2.
        pool.free(a);
        assert_eq!(pool.allocate().unwrap(), 0);
    }

    #[test]
    fn test_saturation_returns_none() {
        let mut pool: Pool<Dummy, 2> = Pool::new();
        for _ in 0..2 {
            let idx = pool.allocate().unwrap();
            pool[idx].live = true;
        }
        assert_eq!(pool.allocate(), None);
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut pool: Pool<Dummy, 2> = Pool::new();
        let idx = pool.allocate().unwrap();
        pool[idx].live = true;
        pool.free(idx);
        pool.free(idx);
        assert_eq!(pool.alive_count(), 0);
        assert!(!pool.is_alive(idx));
    }

    #[test]
    fn test_iter_alive_in_index_order() {
        let mut pool: Pool<Dummy, 4> = Pool::new();
        pool[3].live = true;
        pool[1].live = true;
        let order: Vec<usize> = pool.iter_alive().map(|(i, _)| i).collect();
        assert_eq!(order, vec![1, 3]);
    }
}
