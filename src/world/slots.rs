//! Fixed-capacity slot storage for actors.
//!
//! The wire protocol addresses actors by a small slot index, so storage is a
//! flat array with a free-slot bitmap rather than a keyed map. Every slot
//! carries a generation that bumps on removal; a [`SlotRef`] held across a
//! removal stops resolving instead of silently pointing at whichever actor
//! reused the slot.

use bitvec::vec::BitVec;

/// Index plus generation; the stable handle to one slot occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub index: u16,
    pub generation: u32,
}

pub struct SlotStore<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    occupied: BitVec,
    len: usize,
}

impl<T> SlotStore<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity <= u16::MAX as usize, "slot index space is u16");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            generations: vec![0; capacity],
            occupied: BitVec::repeat(false, capacity),
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Places `value` in the lowest free slot. Gives the value back when the
    /// store is full.
    pub fn insert(&mut self, value: T) -> Result<SlotRef, T> {
        let Some(index) = self.occupied.iter_zeros().next() else {
            return Err(value);
        };
        self.occupied.set(index, true);
        self.slots[index] = Some(value);
        self.len += 1;
        Ok(SlotRef {
            index: index as u16,
            generation: self.generations[index],
        })
    }

    /// Removes the occupant `slot` refers to, if it is still the same
    /// occupancy. The slot's generation bumps so stale refs die with it.
    pub fn remove(&mut self, slot: SlotRef) -> Option<T> {
        if !self.resolves(slot) {
            return None;
        }
        let index = slot.index as usize;
        self.occupied.set(index, false);
        self.generations[index] += 1;
        self.len -= 1;
        self.slots[index].take()
    }

    pub fn get(&self, slot: SlotRef) -> Option<&T> {
        if self.resolves(slot) {
            self.slots[slot.index as usize].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, slot: SlotRef) -> Option<&mut T> {
        if self.resolves(slot) {
            self.slots[slot.index as usize].as_mut()
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, slot: SlotRef) -> bool {
        self.resolves(slot)
    }

    /// Live occupancies in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotRef, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|value| {
                (
                    SlotRef {
                        index: index as u16,
                        generation: self.generations[index],
                    },
                    value,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotRef, &mut T)> + '_ {
        let Self {
            slots, generations, ..
        } = self;
        slots
            .iter_mut()
            .zip(generations.iter())
            .enumerate()
            .filter_map(|(index, (slot, generation))| {
                slot.as_mut().map(|value| {
                    (
                        SlotRef {
                            index: index as u16,
                            generation: *generation,
                        },
                        value,
                    )
                })
            })
    }

    #[inline]
    fn resolves(&self, slot: SlotRef) -> bool {
        let index = slot.index as usize;
        index < self.slots.len()
            && self.occupied[index]
            && self.generations[index] == slot.generation
    }
}
