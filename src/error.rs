//! Error taxonomy for the row index core.
//!
//! Mirrors the shape of `err_at!`-style contextual errors used throughout
//! the indexing code: every fallible path names a variant and a message,
//! so a severe-log entry always has something useful to print.

use std::{fmt, result};

/// Errors the core can surface. Constraint errors (`UniqueViolation`) are
/// raised only from `insert`; `Invariant` indicates a bug in the caller's
/// `Store` implementation and should be treated as fatal by the caller.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// Insert into a unique/primary index found a visible duplicate.
    /// Carries either the constraint's name or, absent a constraint, the
    /// index's own name.
    UniqueViolation { name: String, data: String },
    /// Internal consistency failure, e.g. the store returned `None` for a
    /// handle the tree believes is live. The caller should abort the
    /// transaction; the index itself keeps running by treating the
    /// dereference as an empty subtree.
    Invariant(String),
    /// `Index::get` found no row matching the full key.
    KeyNotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Error::UniqueViolation { name, data } => {
                write!(f, "unique constraint violation on {}: {}", name, data)
            }
            Error::Invariant(msg) => write!(f, "index invariant violated: {}", msg),
            Error::KeyNotFound => write!(f, "key not found"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Construct an `Error` with file/line context folded into the message.
/// Two forms:
///
/// `err_at!(Invariant, msg: "root {} missing", root)` builds and returns
/// `Err(Error::Invariant(..))` directly (an expression, not a statement).
///
/// `err_at!(Invariant, some_option)` turns an `Option` lacking a useful
/// message into an `Error` of the given variant, logging at severe level.
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+ $(,)?) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err($crate::Error::$v(format!("{}: {}", prefix, format!($($arg),+))))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Some(val) => Ok(val),
            None => {
                let prefix = format!("{}:{}", file!(), line!());
                log::error!("{}: {} dereferenced a missing handle", prefix, stringify!($v));
                Err($crate::Error::$v(prefix))
            }
        }
    }};
}
