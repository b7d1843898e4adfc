use std::sync::Arc;

type Word = u64;
const BITS: usize = std::mem::size_of::<Word>() * 8;

#[derive(Clone, Default)]
pub struct ImmutableBitset {
    data: Arc<[Word]>,
}

fn quot_and_rem(index: usize) -> (usize, usize) {
    (index / BITS, index % BITS)
}

impl ImmutableBitset {
    pub fn new(data: Vec<Word>) -> Self {
        Self {
            data: Arc::from(data.into_boxed_slice()),
        }
    }

    pub fn from_indices(capacity: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let len = (capacity + BITS - 1) / BITS;
        let mut data = vec![0; len];
        for index in indices {
            let (quot, rem) = quot_and_rem(index);
            data[quot] |= 1 << rem;
        }
        Self::new(data)
    }

    pub fn contains(&self, index: usize) -> bool {
        if index < self.capacity() {
            let (quot, rem) = quot_and_rem(index);
            let slot = self.data[quot];
            slot & (1 << rem) != 0
        } else {
            false
        }
    }

    /// First set bit at or after `index`.
    pub fn next_set_bit(&self, index: usize) -> Option<usize> {
        if index >= self.capacity() {
            return None;
        }
        let (mut quot, rem) = quot_and_rem(index);
        let mut slot = self.data[quot] & (Word::MAX << rem);
        loop {
            if slot != 0 {
                return Some(quot * BITS + slot.trailing_zeros() as usize);
            }
            quot += 1;
            if quot == self.data.len() {
                return None;
            }
            slot = self.data[quot];
        }
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn capacity(&self) -> usize {
        self.data.len() * BITS
    }

    pub fn data(&self) -> &[Word] {
        &self.data
    }
}
