//! In-memory ordered containers on top of a red-black tree.
//!
//! [`RbTree`] is the engine: a balanced binary search tree ordered by a
//! [`Comparator`], with positions exposed as [`Cursor`]s. [`RbMap`] and
//! [`RbSet`] are thin wrappers for the common key/value and key-only cases.
//!
//! ```
//! use rbtree::RbSet;
//!
//! let mut set = RbSet::new();
//! for k in [10, 12] {
//!     set.insert(k);
//! }
//!
//! let ge = set.find_ge(&11);
//! assert_eq!(set.item(ge), &12);
//! assert!(set.next(ge).is_limit());
//! assert!(set.find_le(&9).is_limit());
//! ```
//!
//! The containers are not synchronized. Share one across threads behind a
//! lock, like any other `&mut`-mutated collection.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod compare;
mod cursor;
mod error;
mod iter;
mod map;
mod node;
mod set;
mod tree;
mod validate;

pub use compare::{Comparator, Natural, ThreeWay};
pub use cursor::Cursor;
pub use error::{Error, Result, ValidationError};
pub use iter::{Iter, Keys, Values};
pub use map::RbMap;
pub use node::{NodeId, TreeId};
pub use set::RbSet;
pub use tree::RbTree;
