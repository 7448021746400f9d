//! Index-construction configuration, kept as one immutable struct rather
//! than free parameters passed to every call.

/// `probe_depth` bounds how deep `search_cost` samples the tree for its
/// selectivity estimate; `use_row_id` is the switch that lets duplicate
/// keys share a subtree by tie-breaking on row position.
#[derive(Clone, Copy, Debug)]
pub struct AvlIndexConfig {
    pub probe_depth: usize,
    pub use_row_id: bool,
}

impl Default for AvlIndexConfig {
    fn default() -> AvlIndexConfig {
        AvlIndexConfig {
            probe_depth: 4,
            use_row_id: true,
        }
    }
}

impl AvlIndexConfig {
    pub fn with_probe_depth(mut self, probe_depth: usize) -> Self {
        self.probe_depth = probe_depth;
        self
    }

    pub fn with_use_row_id(mut self, use_row_id: bool) -> Self {
        self.use_row_id = use_row_id;
        self
    }
}
