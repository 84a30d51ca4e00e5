//! Frontier disciplines shared by the search algorithms.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use grid_chase_core::CellCoord;

/// Pending expansion together with the parent that discovered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) cell: CellCoord,
    pub(crate) parent: Option<CellCoord>,
    pub(crate) cost: u32,
}

#[derive(Debug)]
pub(crate) enum Frontier {
    Stack(Vec<Entry>),
    Queue(VecDeque<Entry>),
    Priority {
        heap: BinaryHeap<Prioritized>,
        sequence: u64,
    },
}

impl Frontier {
    pub(crate) fn stack() -> Self {
        Self::Stack(Vec::new())
    }

    pub(crate) fn queue() -> Self {
        Self::Queue(VecDeque::new())
    }

    pub(crate) fn priority() -> Self {
        Self::Priority {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Adds an entry; `priority` is ignored by the stack and queue.
    pub(crate) fn push(&mut self, entry: Entry, priority: u32) {
        match self {
            Self::Stack(stack) => stack.push(entry),
            Self::Queue(queue) => queue.push_back(entry),
            Self::Priority { heap, sequence } => {
                heap.push(Prioritized {
                    priority,
                    sequence: *sequence,
                    entry,
                });
                *sequence += 1;
            }
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Entry> {
        match self {
            Self::Stack(stack) => stack.pop(),
            Self::Queue(queue) => queue.pop_front(),
            Self::Priority { heap, .. } => heap.pop().map(|item| item.entry),
        }
    }

    pub(crate) fn peek(&self) -> Option<&Entry> {
        match self {
            Self::Stack(stack) => stack.last(),
            Self::Queue(queue) => queue.front(),
            Self::Priority { heap, .. } => heap.peek().map(|item| &item.entry),
        }
    }
}

/// Heap item ordered so that the lowest priority, then the earliest
/// insertion, surfaces first from the max-heap.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Prioritized {
    priority: u32,
    sequence: u64,
    entry: Entry,
}

impl Ord for Prioritized {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
