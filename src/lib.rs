//! Core storage and indexing subsystem for an embeddable relational
//! database: an AVL-tree row index coupled with an abstract, caller-supplied
//! persistence [`Store`](store::Store), plus the chained-bucket hash index
//! used beneath a value pool for interning boxed literals.
//!
//! The index never owns rows or node links directly; every traversal
//! dereferences through the `Store` the caller passes in, so the same
//! [`avl::Index`] code walks an in-memory row cache (see
//! [`store::memory::MemoryStore`]) or, behind a different `Store`
//! implementation, a disk-resident one. MVCC visibility is equally
//! external: callers pass an optional [`session::Session`] and the `Store`
//! decides, per row, whether it is observable.
//!
//! What this crate does *not* do: SQL parsing and planning, write-ahead
//! logging, page layout, LOB storage, transaction management. Those sit
//! above or beside it; this crate only implements the ordered index, the
//! comparator, and the value-interning machinery.

pub mod avl;
pub mod comparator;
pub mod descriptor;
pub mod error;
pub mod hash;
pub mod pool;
pub mod row;
pub mod session;
pub mod store;
pub mod types;
pub mod util;

pub use crate::avl::{AvlIndexConfig, AvlIterator, AvlNode, CompareType, Index};
pub use crate::descriptor::{IndexDescriptor, IndexDescriptorBuilder};
pub use crate::error::{Error, Result};
pub use crate::row::{Row, RowId};
pub use crate::session::Session;
pub use crate::store::{ActionMode, SearchOp, Store};
pub use crate::types::{ColumnType, Value};
