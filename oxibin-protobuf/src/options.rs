//! Decode limits.

/// Resource limits applied by a [`Reader`](crate::Reader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Most elements a non-packed repeated field may accumulate.
    pub max_repeated_elements: usize,
    /// Deepest nesting of legacy groups `skip_type` will walk.
    pub max_group_depth: usize,
}

impl DecodeLimits {
    /// Default limits: one million repeated elements, 64 nested groups.
    pub const DEFAULT: Self = Self {
        max_repeated_elements: 1_000_000,
        max_group_depth: 64,
    };

    /// No practical limit.
    pub const UNLIMITED: Self = Self {
        max_repeated_elements: usize::MAX,
        max_group_depth: usize::MAX,
    };

    /// Create limits.
    pub fn new(max_repeated_elements: usize, max_group_depth: usize) -> Self {
        Self {
            max_repeated_elements,
            max_group_depth,
        }
    }

    /// Replace the repeated element limit.
    pub fn with_max_repeated_elements(mut self, limit: usize) -> Self {
        self.max_repeated_elements = limit;
        self
    }

    /// Replace the group depth limit.
    pub fn with_max_group_depth(mut self, limit: usize) -> Self {
        self.max_group_depth = limit;
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
