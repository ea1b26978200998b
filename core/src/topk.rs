use crate::index::DocId;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub doc_id: DocId,
    pub score: f64,
}

// Heap order looks at the score only.
impl Eq for Scored {}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `k` best candidates seen so far in a min-heap.
#[derive(Debug)]
pub struct TopK {
    k: usize,
    heap: BinaryHeap<Reverse<Scored>>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self { k, heap: BinaryHeap::with_capacity(k) }
    }

    pub fn offer(&mut self, doc_id: DocId, score: f64) {
        let candidate = Scored { doc_id, score };
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(mut min) = self.heap.peek_mut() {
            if candidate > min.0 {
                *min = Reverse(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into descending score order.
    pub fn into_sorted_vec(self) -> Vec<Scored> {
        // Ascending order of Reverse<_> is descending order of scores.
        self.heap.into_sorted_vec().into_iter().map(|Reverse(s)| s).collect()
    }
}
