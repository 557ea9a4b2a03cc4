use crate::space::{DataLayout, NodeIndex, SlabIndex};

/// The position of a logical thread within a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadIndex {
    pub i: usize,
    pub j: usize,
    /// Level relative to the first level of the block.
    pub level: usize,
}

/// A group of logical threads covering consecutive levels of one element.
///
/// Threads are laid out as a `threads_i x threads_j x levels` grid. The grid is sized for the
/// largest node count per axis of all spaces involved in an expression, so some threads have no
/// node in a given space; see [`Block::is_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    element: usize,
    first_level: usize,
    levels: usize,
    threads_i: usize,
    threads_j: usize,
}

impl Block {
    pub fn new(element: usize, first_level: usize, levels: usize, threads_i: usize, threads_j: usize) -> Self {
        Self {
            element,
            first_level,
            levels,
            threads_i,
            threads_j,
        }
    }

    pub fn element(&self) -> usize {
        self.element
    }

    pub fn first_level(&self) -> usize {
        self.first_level
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn num_threads(&self) -> usize {
        self.threads_i * self.threads_j * self.levels
    }

    pub fn threads(&self) -> impl Iterator<Item = ThreadIndex> {
        let (threads_i, threads_j) = (self.threads_i, self.threads_j);
        (0..self.levels).flat_map(move |level| {
            (0..threads_j).flat_map(move |j| (0..threads_i).map(move |i| ThreadIndex { i, j, level }))
        })
    }

    pub fn node(&self, thread: ThreadIndex) -> NodeIndex {
        NodeIndex {
            i: thread.i,
            j: thread.j,
            v: self.first_level + thread.level,
            h: self.element,
        }
    }

    pub fn slab(&self, thread: ThreadIndex) -> SlabIndex {
        SlabIndex {
            h: self.element,
            v: self.first_level + thread.level,
        }
    }

    /// Whether the thread corresponds to a node of a space with the given layout.
    pub fn is_active(&self, thread: ThreadIndex, layout: &DataLayout) -> bool {
        thread.i < layout.nq() && thread.j < layout.nq_j() && self.first_level + thread.level < layout.num_levels()
    }

    /// Index of the thread's node in a block-local buffer holding one slab of the given layout
    /// per level of the block.
    pub fn buffer_index(&self, thread: ThreadIndex, layout: &DataLayout) -> usize {
        (thread.level * layout.nq_j() + thread.j) * layout.nq() + thread.i
    }

    /// Runs one phase of the block.
    ///
    /// `f` is invoked once for every thread of the block, and all invocations have completed
    /// when this returns. The return is therefore the synchronization barrier between
    /// consecutive phases.
    pub fn run_phase(&self, mut f: impl FnMut(ThreadIndex)) {
        for thread in self.threads() {
            f(thread);
        }
    }
}
