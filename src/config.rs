//! Tunables for codec construction and search runs.

/// Memory bounds for the Combination Codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecLimits {
    /// Upper bound on `num_boxes * C(num_spaces, num_boxes)`, the number of
    /// space indices held by the rank table.
    pub max_entries: u64,
}

impl Default for CodecLimits {
    fn default() -> Self {
        CodecLimits {
            max_entries: 1 << 25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    /// Stop with `Aborted(ExpansionLimit)` after this many expansions.
    pub max_expansions: Option<usize>,
    /// Weight of the depth term in the best-first cost. Empirically tuned.
    pub depth_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_expansions: None,
            depth_weight: 2.0,
        }
    }
}
