use std::fmt;

use crate::avl::depth::Depth;

/// Statistics for one AVL index, gathered by [`Index::validate`]
/// via a full in-order walk that checks the balance invariant and records
/// leaf depths along the way.
///
/// [`Index::validate`]: crate::avl::index::Index::validate
pub struct Stats {
    pub name: String,
    pub n_count: usize,
    pub height: usize,
    pub depths: Option<Depth>,
}

impl Stats {
    pub(crate) fn new(name: &str) -> Stats {
        Stats {
            name: name.to_string(),
            n_count: 0,
            height: 0,
            depths: None,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = self.depths.as_ref().map_or("none".to_string(), |x| x.to_string());
        writeln!(f, "avl.name = {}", self.name)?;
        writeln!(f, "avl = {{ n_count={}, height={} }}", self.n_count, self.height)?;
        writeln!(f, "avl.depths = {}", d)
    }
}
