use core::fmt;
use core::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Link to another node in the same arena. `None` plays the role of the
/// (black) nil leaf.
pub(crate) type Link = Option<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub(crate) fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub(crate) fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Identity of a tree. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// Stable handle of a node.
///
/// The handle stays valid while the node is in the tree, regardless of how
/// the tree is restructured around it. Once the node is deleted its slot may
/// be reused, but the generation differs so the old handle is recognized as
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodePos {
    Root,
    Left,
    Right,
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Link,
    pub(crate) left: Link,
    pub(crate) right: Link,
    // Owning tree, checked when a deletion request comes in through a cursor.
    pub(crate) tree: TreeId,
}

impl<K, V> Node<K, V> {
    /// New nodes always enter the tree as red leaves.
    pub(crate) fn leaf(key: K, value: V, parent: Link, tree: TreeId) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
            tree,
        }
    }
}

#[derive(Clone)]
struct Slot<K, V> {
    generation: u32,
    node: Option<Node<K, V>>,
}

/// Slot storage for the nodes of one tree.
///
/// Freed slots are kept on a free list and handed out again by [`alloc`],
/// with their generation bumped.
///
/// [`alloc`]: Arena::alloc
#[derive(Clone)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                debug_assert!(slot.node.is_none(), "free list points to a live slot");
                slot.node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Takes the node out of its slot. Every handle to it becomes stale.
    pub(crate) fn free(&mut self, index: usize) -> Node<K, V> {
        let slot = &mut self.slots[index];
        let node = slot
            .node
            .take()
            .expect("freeing an arena slot that is already vacant");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        node
    }

    /// Frees every node. Slots are kept so that old handles stay stale
    /// instead of aliasing nodes allocated later.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index);
        }
    }

    /// Handle for the live node at `index`.
    #[inline]
    pub(crate) fn id(&self, index: usize) -> NodeId {
        NodeId {
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Maps a handle back to its slot, or `None` if the node it referred to
    /// has been freed.
    pub(crate) fn resolve(&self, id: NodeId) -> Link {
        match self.slots.get(id.index) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => {
                Some(id.index)
            }
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn color_of(&self, link: Link) -> Color {
        link.map_or(Color::Black, |n| self[n].color)
    }

    #[inline]
    pub(crate) fn pos(&self, n: usize) -> NodePos {
        match self[n].parent {
            None => NodePos::Root,
            Some(p) if self[p].left == Some(n) => NodePos::Left,
            Some(p) => {
                debug_assert_eq!(self[p].right, Some(n), "parent does not link back to child");
                NodePos::Right
            }
        }
    }

    pub(crate) fn min_of(&self, mut n: usize) -> usize {
        while let Some(left) = self[n].left {
            n = left;
        }
        n
    }

    pub(crate) fn max_of(&self, mut n: usize) -> usize {
        while let Some(right) = self[n].right {
            n = right;
        }
        n
    }

    /// In-order successor of `n`.
    pub(crate) fn successor(&self, mut n: usize) -> Link {
        //       +---------- 34 ---------+
        //       |                       |
        // +---- 2 ----+                 58 ----+
        // |           |                        |
        // 1      +--- 9 ----+              +-- 77 --+
        //        |          |              |        |
        //     +- 6       +- 20 -+      +- 71 -+     82
        //     |          |      |      |      |
        //     5         12 -+   24    67      75
        //                   |
        //                   13
        if let Some(right) = self[n].right {
            // 9 -> 12, 2 -> 5, 58 -> 67
            return Some(self.min_of(right));
        }

        // 6 -> 9, 1 -> 2, 13 -> 20, 24 -> 34
        // Climb until we arrive from a left child; that parent is the successor.
        while let Some(parent) = self[n].parent {
            if self[parent].left == Some(n) {
                return Some(parent);
            }
            n = parent;
        }
        None
    }

    /// In-order predecessor of `n`.
    pub(crate) fn predecessor(&self, mut n: usize) -> Link {
        if let Some(left) = self[n].left {
            // 2 -> 1, 9 -> 6, 20 -> 13, 77 -> 75
            return Some(self.max_of(left));
        }

        // 12 -> 9, 58 -> 34, 67 -> 58
        while let Some(parent) = self[n].parent {
            if self[parent].right == Some(n) {
                return Some(parent);
            }
            n = parent;
        }
        None
    }
}

impl<K, V> Index<usize> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.slots[index]
            .node
            .as_ref()
            .expect("link to a vacant arena slot")
    }
}

impl<K, V> IndexMut<usize> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.slots[index]
            .node
            .as_mut()
            .expect("link to a vacant arena slot")
    }
}
