use core::cmp::Ordering;
use core::fmt;
use core::mem;

use tracing::trace;

use crate::compare::{Comparator, Natural};
use crate::cursor::Cursor;
use crate::node::{Arena, Color, Link, Node, NodePos, TreeId};

/// Red-black tree keyed by `K`, ordered by the comparator `C`.
///
/// Nodes live in an arena owned by the tree and refer to each other by slot
/// index, so parent back-links don't need shared ownership. Positions in the
/// tree are handed out as [`Cursor`]s, which stay valid across unrelated
/// insertions and deletions.
pub struct RbTree<K, V, C = Natural> {
    pub(crate) nodes: Arena<K, V>,
    pub(crate) root: Link,
    // Leftmost and rightmost nodes, `None` iff the tree is empty.
    pub(crate) min: Link,
    pub(crate) max: Link,
    pub(crate) len: usize,
    pub(crate) cmp: C,
    pub(crate) id: TreeId,
}

/// Result of descending the tree in search of a key.
enum Descent {
    Found(usize),
    // Empty slot where the key belongs: the would-be parent and which of its
    // children the new node becomes. `(None, NodePos::Root)` for an empty tree.
    Vacant(Link, NodePos),
}

impl<K, V> RbTree<K, V, Natural>
where
    K: Ord,
{
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V> Default for RbTree<K, V, Natural>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    C: Comparator<K>,
{
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            min: None,
            max: None,
            len: 0,
            cmp,
            id: TreeId::next(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Identity of this tree, as reported by [`Cursor::tree_id`].
    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Removes every element. Cursors obtained before the call become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.min = None;
        self.max = None;
        self.len = 0;
    }

    #[inline]
    pub(crate) fn cursor_at(&self, link: Link) -> Cursor {
        Cursor::new(self.id, link.map(|n| self.nodes.id(n)))
    }

    /// Cursor to the smallest element, or the limit if the tree is empty.
    #[inline]
    pub fn min(&self) -> Cursor {
        self.cursor_at(self.min)
    }

    /// Cursor to the largest element, or the limit if the tree is empty.
    #[inline]
    pub fn max(&self) -> Cursor {
        self.cursor_at(self.max)
    }

    /// The "no position" cursor of this tree.
    #[inline]
    pub fn limit(&self) -> Cursor {
        self.cursor_at(None)
    }

    /// Cursor to the element equal to `key`, or the limit.
    pub fn find(&self, key: &K) -> Cursor {
        self.cursor_at(self.find_node(key))
    }

    /// Cursor to the smallest element `>= key`, or the limit.
    pub fn find_ge(&self, key: &K) -> Cursor {
        self.cursor_at(self.find_ge_node(key).0)
    }

    /// Cursor to the largest element `<= key`, or the limit.
    pub fn find_le(&self, key: &K) -> Cursor {
        self.cursor_at(self.find_le_node(key))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|n| &self.nodes[n].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_node(key).map(|n| &mut self.nodes[n].value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|n| {
            let node = &self.nodes[n];
            (&node.key, &node.value)
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    pub(crate) fn find_node(&self, key: &K) -> Link {
        match self.find_ge_node(key) {
            (n, true) => n,
            _ => None,
        }
    }

    /// Smallest node `>= key`. The flag is `true` iff the node equals `key`.
    pub(crate) fn find_ge_node(&self, key: &K) -> (Link, bool) {
        let Some(mut x) = self.root else {
            return (None, false);
        };

        loop {
            let node = &self.nodes[x];
            match self.cmp.compare(key, &node.key) {
                Ordering::Equal => return (Some(x), true),
                Ordering::Less => match node.left {
                    Some(left) => x = left,
                    // Bottomed out at a node greater than `key`.
                    None => return (Some(x), false),
                },
                Ordering::Greater => match node.right {
                    Some(right) => x = right,
                    // Bottomed out at a node smaller than `key`, the answer is
                    // the next node in order. It is strictly greater than `key`
                    // because we turned left at it on the way down.
                    None => return (self.nodes.successor(x), false),
                },
            }
        }
    }

    pub(crate) fn find_le_node(&self, key: &K) -> Link {
        match self.find_ge_node(key) {
            (n, true) => n,
            (Some(n), false) => self.nodes.predecessor(n),
            // Every element is smaller than `key`.
            (None, _) => self.max,
        }
    }

    fn descend(&self, key: &K) -> Descent {
        let mut parent = None;
        let mut pos = NodePos::Root;
        let mut maybe_node = self.root;
        while let Some(x) = maybe_node {
            let node = &self.nodes[x];
            parent = Some(x);
            match self.cmp.compare(key, &node.key) {
                Ordering::Less => {
                    pos = NodePos::Left;
                    maybe_node = node.left;
                }
                Ordering::Equal => return Descent::Found(x),
                Ordering::Greater => {
                    pos = NodePos::Right;
                    maybe_node = node.right;
                }
            }
        }

        Descent::Vacant(parent, pos)
    }

    /// Inserts `key` with `value` unless an equal key is already present.
    ///
    /// Returns a cursor to the element with this key and whether it was newly
    /// inserted. An existing element is left untouched and the arguments are
    /// dropped.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        match self.descend(&key) {
            Descent::Found(n) => (self.cursor_at(Some(n)), false),
            Descent::Vacant(parent, pos) => {
                let n = self.attach(key, value, parent, pos);
                (self.cursor_at(Some(n)), true)
            }
        }
    }

    /// Inserts `key` with `value`, replacing the value of an existing equal
    /// key. The stored key is kept in that case. Returns the previous value.
    pub fn insert_or_update(&mut self, key: K, value: V) -> (Cursor, Option<V>) {
        match self.descend(&key) {
            Descent::Found(n) => {
                let old = mem::replace(&mut self.nodes[n].value, value);
                (self.cursor_at(Some(n)), Some(old))
            }
            Descent::Vacant(parent, pos) => {
                let n = self.attach(key, value, parent, pos);
                (self.cursor_at(Some(n)), None)
            }
        }
    }

    /// Links a new red leaf into the vacant slot found by [`descend`] and
    /// restores the red-black properties.
    ///
    /// [`descend`]: RbTree::descend
    fn attach(&mut self, key: K, value: V, parent: Link, pos: NodePos) -> usize {
        let n = self.nodes.alloc(Node::leaf(key, value, parent, self.id));
        match (parent, pos) {
            (None, _) => {
                self.root = Some(n);
                self.min = Some(n);
                self.max = Some(n);
            }
            (Some(p), NodePos::Left) => {
                self.nodes[p].left = Some(n);
                // A new left child is smaller than everything except what
                // was already smaller than its parent.
                if self.min == Some(p) {
                    self.min = Some(n);
                }
            }
            (Some(p), NodePos::Right) => {
                self.nodes[p].right = Some(n);
                if self.max == Some(p) {
                    self.max = Some(n);
                }
            }
            (Some(_), NodePos::Root) => unreachable!("non-empty descent always picks a side"),
        }

        self.len += 1;
        self.insert_fixup(n);
        n
    }

    fn insert_fixup(&mut self, mut node: usize) {
        loop {
            let Some(mut parent) = self.nodes[node].parent else {
                // Case A: node is the root.
                self.nodes[node].color = Color::Black;
                break;
            };

            if self.nodes[parent].color.is_black() {
                // Case B: nothing is violated.
                break;
            }

            // Parent is red, so it's not the root and the grandparent exists
            // and is black.
            let grand_parent = self.nodes[parent]
                .parent
                .expect("red node cannot be the root");
            debug_assert!(self.nodes[grand_parent].color.is_black());
            let parent_pos = self.nodes.pos(parent);
            let uncle = match parent_pos {
                NodePos::Left => self.nodes[grand_parent].right,
                NodePos::Right => self.nodes[grand_parent].left,
                NodePos::Root => unreachable!(),
            };

            if let Some(uncle) = uncle.filter(|&u| self.nodes[u].color.is_red()) {
                // Case C:
                //     +--- gp:b ---+               +--- gp:r ---+
                //     |            |               |            |
                //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                //  |     |      |     |         |     |      |     |
                // n:r   a:b    b:b   c:b       n:r   a:b    b:b   c:b
                //
                // Black height is unchanged, but gp may now have a red parent.
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grand_parent].color = Color::Red;
                node = grand_parent;
                continue;
            }

            match parent_pos {
                NodePos::Left => {
                    if self.nodes.pos(node) == NodePos::Right {
                        // Case D: inner grandchild, make it an outer one.
                        //       +-- gp:b --+                 +-- gp:b --+
                        //       |          |                 |          |
                        //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                        //  |         |                   |        |
                        // a:b    +- n:r -+           +- p:r -+   c:b
                        //        |       |           |       |
                        //       b:b     c:b         a:b     b:b
                        self.rotate_left(parent);
                        mem::swap(&mut parent, &mut node);
                    }

                    // Case E:
                    //           +-- gp:b --+            +----- p:b -----+
                    //           |          |            |               |
                    //      +-- p:r --+    u:b  -->   +- n:r -+     +- gp:r -+
                    //      |         |               |       |     |        |
                    //  +- n:r -+    c:b             a:b     b:b   c:b      u:b
                    //  |       |
                    // a:b     b:b
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grand_parent].color = Color::Red;
                    self.rotate_right(grand_parent);
                }
                NodePos::Right => {
                    // same as above with left and right switched
                    if self.nodes.pos(node) == NodePos::Left {
                        self.rotate_right(parent);
                        mem::swap(&mut parent, &mut node);
                    }

                    self.nodes[parent].color = Color::Black;
                    self.nodes[grand_parent].color = Color::Red;
                    self.rotate_left(grand_parent);
                }
                NodePos::Root => unreachable!(),
            }
            break;
        }
    }

    /// Removes the element equal to `key` and returns it.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        self.find_node(key).map(|n| self.delete_node(n))
    }

    /// Removes the element equal to `key`. Returns `true` iff it was present.
    pub fn delete_with_key(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Unlinks `node` from the tree, frees its slot and returns its contents.
    pub(crate) fn delete_node(&mut self, node: usize) -> (K, V) {
        if let (Some(left), Some(_)) = (self.nodes[node].left, self.nodes[node].right) {
            // Move `node` down into its predecessor's place. Swapping the
            // nodes themselves rather than their contents keeps every cursor
            // pointing at the element it was pointing at.
            let pred = self.nodes.max_of(left);
            trace!(tree = %self.id, node, pred, "swapping positions with predecessor");
            self.swap_positions(node, pred);
        }

        let (left, right) = (self.nodes[node].left, self.nodes[node].right);
        debug_assert!(left.is_none() || right.is_none());
        let child = right.or(left);

        if self.nodes[node].color.is_black() {
            match child {
                // A black node with a single child always has a red leaf
                // there; painting it black pays back the lost black.
                Some(child) if self.nodes[child].color.is_red() => {
                    self.nodes[child].color = Color::Black;
                }
                // Removing a black leaf. Rebalance while it still holds its
                // slot, then unlink it.
                _ => self.delete_fixup(node),
            }
        }

        self.replace_subtree(node, child);
        if let (None, Some(child)) = (self.nodes[node].parent, child) {
            self.nodes[child].color = Color::Black;
        }

        let removed = self.nodes.free(node);
        self.len -= 1;
        if self.len == 0 {
            self.min = None;
            self.max = None;
        } else {
            if self.min == Some(node) {
                self.min = self.root.map(|r| self.nodes.min_of(r));
                trace!(tree = %self.id, min = ?self.min, "recomputed min");
            }
            if self.max == Some(node) {
                self.max = self.root.map(|r| self.nodes.max_of(r));
                trace!(tree = %self.id, max = ?self.max, "recomputed max");
            }
        }

        (removed.key, removed.value)
    }

    /// Exchanges the places of `node` and `pred` in the tree, including
    /// their colors. `pred` must be the predecessor of `node`, which has two
    /// children.
    fn swap_positions(&mut self, node: usize, pred: usize) {
        //         p                        p
        //         |                        |
        //    +- node -+               +- pred -+
        //    |        |               |        |
        //    a    ... c      -->      a    ... c
        //    |                        |
        //    +-- x --+                +-- x --+
        //            |                        |
        //       +- pred                  +- node
        //       |                        |
        //       b                        b
        //
        // with the special case x == pred handled separately, where pred's
        // old parent is `node` itself.
        debug_assert_ne!(node, pred);
        let Node {
            left: node_left,
            right: node_right,
            color: node_color,
            ..
        } = self.nodes[node];
        let Node {
            parent: pred_parent,
            left: pred_left,
            right: pred_right,
            color: pred_color,
            ..
        } = self.nodes[pred];
        debug_assert!(pred_right.is_none(), "predecessor has no right child");

        self.replace_subtree(node, Some(pred));

        if pred_parent == Some(node) {
            debug_assert_eq!(node_left, Some(pred));
            self.nodes[pred].left = Some(node);
            self.nodes[node].parent = Some(pred);
        } else {
            let pred_parent = pred_parent.expect("predecessor below `node` has a parent");
            debug_assert_eq!(self.nodes[pred_parent].right, Some(pred));
            self.nodes[pred].left = node_left;
            if let Some(l) = node_left {
                self.nodes[l].parent = Some(pred);
            }
            self.nodes[pred_parent].right = Some(node);
            self.nodes[node].parent = Some(pred_parent);
        }

        self.nodes[pred].right = node_right;
        if let Some(r) = node_right {
            self.nodes[r].parent = Some(pred);
        }

        self.nodes[node].left = pred_left;
        if let Some(l) = pred_left {
            self.nodes[l].parent = Some(node);
        }
        self.nodes[node].right = pred_right;

        self.nodes[pred].color = node_color;
        self.nodes[node].color = pred_color;
    }

    /// Fixes the black deficiency on paths through `node`, which is black and
    /// still linked at its original position.
    fn delete_fixup(&mut self, mut node: usize) {
        while let Some(parent) = self.nodes[node].parent {
            let node_pos = self.nodes.pos(node);
            let mut sibling = self.sibling(node);

            if self.nodes[sibling].color.is_red() {
                //     ┌─── p:b ───┐                    ┌─── s:b ───┐
                //     │           │                    │           │
                // ┌─ n:b ─┐   ┌─ s:r ─┐   ──►      ┌─ p:r ─┐      d:b
                // │       │   │       │            │       │
                // a       b  c:b     d:b       ┌─ n:b ─┐  c:b
                //                              │       │
                //                              a       b
                // Paths through n still lack a black, but n now has a red
                // parent and a black sibling, handled below.
                self.nodes[parent].color = Color::Red;
                self.nodes[sibling].color = Color::Black;
                self.rotate_toward(parent, node_pos);
                sibling = self.sibling(node);
            }

            let (near, far) = match node_pos {
                NodePos::Left => (self.nodes[sibling].left, self.nodes[sibling].right),
                _ => (self.nodes[sibling].right, self.nodes[sibling].left),
            };
            let nephews_black =
                self.nodes.color_of(near).is_black() && self.nodes.color_of(far).is_black();
            let parent_black = self.nodes[parent].color.is_black();
            let sibling_black = self.nodes[sibling].color.is_black();

            if parent_black && sibling_black && nephews_black {
                //     ┌─── p:b ───┐                ┌─── p:b ───┐
                //     │           │                │           │
                // ┌─ n:b ─┐   ┌─ s:b ─┐   ──►  ┌─ n:b ─┐   ┌─ s:r ─┐
                // │       │   │       │        │       │   │       │
                // a       b  c:b     d:b       a       b  c:b     d:b
                // Both sides of p are short by one now, push the problem up.
                self.nodes[sibling].color = Color::Red;
                node = parent;
                continue;
            }

            if sibling_black && nephews_black {
                // Parent is red: trade colors with the sibling.
                self.nodes[sibling].color = Color::Red;
                self.nodes[parent].color = Color::Black;
                break;
            }

            // Sibling is black with at least one red child.
            if self.nodes.color_of(far).is_black() {
                //    ┌───── p:c ─────┐                ┌─── p:c ───┐
                //    │               │                │           │
                // ┌─ n:b ─┐      ┌─ s:b ─┐   ──►  ┌─ n:b ─┐   ┌─ c:b ─┐
                // │       │      │       │        │       │   │       │
                // a       b  ┌─ c:r ─┐  d:b       a       b   e   ┌─ s:r ─┐
                //            │       │                            │       │
                //            e       f                            f      d:b
                // Bring the red nephew to the outer side.
                let near = near.expect("red nephew exists");
                self.nodes[sibling].color = Color::Red;
                self.nodes[near].color = Color::Black;
                self.rotate_away(sibling, node_pos);
                sibling = self.sibling(node);
            }

            //     ┌─── p:c ───┐                     ┌── s:c ──┐
            //     │           │                     │         │
            // ┌─ n:b ─┐   ┌─ s:b ─┐   ──►       ┌─ p:b ─┐    d:b
            // │       │   │       │             │       │
            // a       b  c:?     d:r       ┌─ n:b ─┐   c:?
            //                              │       │
            //                              a       b
            let far = match node_pos {
                NodePos::Left => self.nodes[sibling].right,
                _ => self.nodes[sibling].left,
            }
            .expect("outer nephew is red");
            debug_assert!(self.nodes[far].color.is_red());
            self.nodes[sibling].color = self.nodes[parent].color;
            self.nodes[parent].color = Color::Black;
            self.nodes[far].color = Color::Black;
            self.rotate_toward(parent, node_pos);
            break;
        }
    }

    fn sibling(&self, node: usize) -> usize {
        let parent = self.nodes[node].parent;
        let sibling = match self.nodes.pos(node) {
            NodePos::Left => parent.and_then(|p| self.nodes[p].right),
            NodePos::Right => parent.and_then(|p| self.nodes[p].left),
            NodePos::Root => None,
        };
        // Paths through a black non-root node have a black height of at
        // least two, so the other side can't be empty.
        sibling.expect("black non-root node must have a sibling")
    }

    /// Rotates at `node` so that its child on the side opposite `side` moves
    /// up and `node` moves down toward `side`.
    fn rotate_toward(&mut self, node: usize, side: NodePos) {
        match side {
            NodePos::Left => self.rotate_left(node),
            _ => self.rotate_right(node),
        }
    }

    fn rotate_away(&mut self, node: usize, side: NodePos) {
        match side {
            NodePos::Left => self.rotate_right(node),
            _ => self.rotate_left(node),
        }
    }

    pub(crate) fn rotate_left(&mut self, node: usize) {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        // where a, b, c can be any subtrees
        let right = self.nodes[node]
            .right
            .expect("left rotation needs a right child");
        self.replace_subtree(node, Some(right));

        // attach b to node
        let b = self.nodes[right].left;
        self.nodes[node].right = b;
        if let Some(b) = b {
            self.nodes[b].parent = Some(node);
        }

        // attach node to right
        self.nodes[right].left = Some(node);
        self.nodes[node].parent = Some(right);
    }

    pub(crate) fn rotate_right(&mut self, node: usize) {
        //         p              p
        //         |              |
        //     +-node-+       +-left-+
        //     |      |       |      |
        // +-left-+   c  -->  a  +-node-+
        // |      |              |      |
        // a      b              b      c
        // where a, b, c can be any subtrees
        let left = self.nodes[node]
            .left
            .expect("right rotation needs a left child");
        self.replace_subtree(node, Some(left));

        let b = self.nodes[left].right;
        self.nodes[node].left = b;
        if let Some(b) = b {
            self.nodes[b].parent = Some(node);
        }

        self.nodes[left].right = Some(node);
        self.nodes[node].parent = Some(left);
    }

    /// Puts subtree `new` in the place `old` occupies under its parent.
    /// `old` keeps its own links.
    fn replace_subtree(&mut self, old: usize, new: Link) {
        let parent = self.nodes[old].parent;
        match self.nodes.pos(old) {
            NodePos::Root => self.root = new,
            NodePos::Left => self.nodes[parent.expect("left child has a parent")].left = new,
            NodePos::Right => self.nodes[parent.expect("right child has a parent")].right = new,
        }

        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }
}

impl<K, V, C> Clone for RbTree<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Clone,
{
    /// The clone is a distinct tree: cursors of `self` don't apply to it.
    fn clone(&self) -> Self {
        let id = TreeId::next();
        let mut nodes = self.nodes.clone();
        let mut maybe_node = self.min;
        while let Some(n) = maybe_node {
            nodes[n].tree = id;
            maybe_node = self.nodes.successor(n);
        }

        Self {
            nodes,
            root: self.root,
            min: self.min,
            max: self.max,
            len: self.len,
            cmp: self.cmp.clone(),
            id,
        }
    }
}

impl<K, V, C> fmt::Debug for RbTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Nodes<'a, K, V> {
            nodes: &'a Arena<K, V>,
            first: Link,
        }

        impl<K, V> fmt::Debug for Nodes<'_, K, V>
        where
            K: fmt::Debug,
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();
                let mut maybe_node = self.first;
                while let Some(n) = maybe_node {
                    let node = &self.nodes[n];
                    f.entry(&(&node.key, &node.value, node.color));
                    maybe_node = self.nodes.successor(n);
                }
                f.finish()
            }
        }

        f.debug_struct("RbTree")
            .field("id", &self.id)
            .field("len", &self.len)
            .field(
                "nodes",
                &Nodes {
                    nodes: &self.nodes,
                    first: self.min,
                },
            )
            .finish()
    }
}
