//! Structural self-checks and dumps. Not used by any operation; meant for
//! tests and for debugging a suspicious comparator.

use core::cmp::Ordering;
use core::fmt::{self, Write};

use crate::compare::Comparator;
use crate::error::ValidationError;
use crate::node::Link;
use crate::tree::RbTree;

impl<K, V, C> RbTree<K, V, C>
where
    C: Comparator<K>,
{
    /// Walks the whole tree and checks every structural invariant: parent
    /// and child links agree, no red node has a red child, all paths have
    /// the same black height, the root is black, keys are strictly ordered,
    /// the cached bounds are the real ones and the length matches.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        let Some(root) = self.root else {
            if self.min.is_some() {
                return Err(ValidationError::StaleBound { bound: "min" });
            }
            if self.max.is_some() {
                return Err(ValidationError::StaleBound { bound: "max" });
            }
            if self.len != 0 {
                return Err(ValidationError::LenMismatch {
                    reported: self.len,
                    reachable: 0,
                });
            }
            return Ok(());
        };

        if self.nodes[root].parent.is_some() {
            return Err(ValidationError::RootHasParent { node: root });
        }
        if self.nodes[root].color.is_red() {
            return Err(ValidationError::RedRoot);
        }

        let mut reachable = 0;
        self.check_subtree(root, None, None, &mut reachable)?;
        if reachable != self.len {
            return Err(ValidationError::LenMismatch {
                reported: self.len,
                reachable,
            });
        }

        if self.min != Some(self.nodes.min_of(root)) {
            return Err(ValidationError::StaleBound { bound: "min" });
        }
        if self.max != Some(self.nodes.max_of(root)) {
            return Err(ValidationError::StaleBound { bound: "max" });
        }

        Ok(())
    }

    /// Returns the black height of the subtree at `n`, counting the nil
    /// leaves. `lower` and `upper` are the closest ancestors the subtree
    /// must stay strictly between.
    fn check_subtree(
        &self,
        n: usize,
        lower: Link,
        upper: Link,
        count: &mut usize,
    ) -> Result<usize, ValidationError> {
        let node = &self.nodes[n];
        *count += 1;

        if node.tree != self.id {
            return Err(ValidationError::ForeignNode { node: n });
        }
        if let Some(lower) = lower {
            if self.cmp.compare(&self.nodes[lower].key, &node.key) != Ordering::Less {
                return Err(ValidationError::OutOfOrder { node: n });
            }
        }
        if let Some(upper) = upper {
            if self.cmp.compare(&node.key, &self.nodes[upper].key) != Ordering::Less {
                return Err(ValidationError::OutOfOrder { node: n });
            }
        }

        let mut heights = [1, 1];
        for (i, child) in [node.left, node.right].into_iter().enumerate() {
            let Some(child) = child else { continue };
            if self.nodes[child].parent != Some(n) {
                return Err(ValidationError::BrokenParentLink { node: child });
            }
            if node.color.is_red() && self.nodes[child].color.is_red() {
                return Err(ValidationError::RedRed { node: n });
            }
            heights[i] = if i == 0 {
                self.check_subtree(child, lower, Some(n), count)?
            } else {
                self.check_subtree(child, Some(n), upper, count)?
            };
        }

        let [left, right] = heights;
        if left != right {
            return Err(ValidationError::BlackHeight {
                node: n,
                left,
                right,
            });
        }
        Ok(left + usize::from(node.color.is_black()))
    }

    /// Human readable listing of the tree: the elements in order, then the
    /// shape with colors and links.
    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
    {
        let mut out = String::new();
        for (i, key) in self.keys().enumerate() {
            // writing into a String can't fail
            let _ = writeln!(out, "node {i:03}: {key:?}");
        }
        if let Some(root) = self.root {
            self.walk(&mut out, root, 0, "root");
        }
        out
    }

    fn walk(&self, out: &mut String, n: usize, indent: usize, label: &str)
    where
        K: fmt::Debug,
    {
        let node = &self.nodes[n];
        let key_of = |link: Link| link.map(|l| &self.nodes[l].key);
        let _ = writeln!(
            out,
            "{:width$}{label} [{:?}] {:?} parent: {:?} left: {:?} right: {:?}",
            "",
            node.color,
            node.key,
            key_of(node.parent),
            key_of(node.left),
            key_of(node.right),
            width = indent * 3,
        );
        if let Some(left) = node.left {
            self.walk(out, left, indent + 1, "left");
        }
        if let Some(right) = node.right {
            self.walk(out, right, indent + 1, "right");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::Color;

    use super::*;

    fn tree_of(keys: &[i32]) -> RbTree<i32, ()> {
        let mut tree = RbTree::new();
        for &k in keys {
            tree.insert(k, ());
        }
        tree
    }

    #[test]
    fn valid_trees_pass() {
        assert_eq!(tree_of(&[]).check_invariants(), Ok(()));
        assert_eq!(tree_of(&[1]).check_invariants(), Ok(()));
        assert_eq!(tree_of(&[3, 1, 2, 5, 4]).check_invariants(), Ok(()));
    }

    #[test]
    fn detects_red_root() {
        let mut tree = tree_of(&[1, 2]);
        let root = tree.root.unwrap();
        tree.nodes[root].color = Color::Red;
        assert_eq!(tree.check_invariants(), Err(ValidationError::RedRoot));
    }

    #[test]
    fn detects_red_red() {
        // inserting 4 pushes the red up: 1 and 3 end up black, 4 red
        let mut tree = tree_of(&[2, 1, 3, 4]);
        let n3 = tree.find_node(&3).unwrap();
        tree.nodes[n3].color = Color::Red;
        assert_eq!(
            tree.check_invariants(),
            Err(ValidationError::RedRed { node: n3 })
        );
    }

    #[test]
    fn detects_black_height() {
        let mut tree = tree_of(&[2, 1, 3]);
        let n1 = tree.find_node(&1).unwrap();
        tree.nodes[n1].color = Color::Black;
        assert!(matches!(
            tree.check_invariants(),
            Err(ValidationError::BlackHeight { .. })
        ));
    }

    #[test]
    fn detects_broken_link() {
        let mut tree = tree_of(&[2, 1, 3]);
        let n1 = tree.find_node(&1).unwrap();
        let n3 = tree.find_node(&3).unwrap();
        tree.nodes[n1].parent = Some(n3);
        assert_eq!(
            tree.check_invariants(),
            Err(ValidationError::BrokenParentLink { node: n1 })
        );
    }

    #[test]
    fn detects_out_of_order() {
        let mut tree = tree_of(&[2, 1, 3]);
        let n1 = tree.find_node(&1).unwrap();
        tree.nodes[n1].key = 7;
        assert_eq!(
            tree.check_invariants(),
            Err(ValidationError::OutOfOrder { node: n1 })
        );
    }

    #[test]
    fn detects_stale_bounds_and_len() {
        let mut tree = tree_of(&[2, 1, 3]);
        tree.min = tree.root;
        assert_eq!(
            tree.check_invariants(),
            Err(ValidationError::StaleBound { bound: "min" })
        );

        let mut tree = tree_of(&[2, 1, 3]);
        tree.len = 4;
        assert_eq!(
            tree.check_invariants(),
            Err(ValidationError::LenMismatch {
                reported: 4,
                reachable: 3,
            })
        );
    }

    #[test]
    fn dump_lists_nodes() {
        let tree = tree_of(&[2, 1, 3]);
        let dump = tree.dump();
        let mut lines = dump.lines();
        assert_eq!(lines.next(), Some("node 000: 1"));
        assert_eq!(lines.next(), Some("node 001: 2"));
        assert_eq!(lines.next(), Some("node 002: 3"));
        assert_eq!(
            lines.next(),
            Some("root [Black] 2 parent: None left: Some(1) right: Some(3)")
        );
        assert_eq!(
            lines.next(),
            Some("   left [Red] 1 parent: Some(2) left: None right: None")
        );
        assert_eq!(
            lines.next(),
            Some("   right [Red] 3 parent: Some(2) left: None right: None")
        );
        assert_eq!(lines.next(), None);
        assert_eq!(tree_of(&[]).dump(), "");
    }
}
