/// Maximum number of elements a leaf may hold.
pub const BVH_MAX_LEAVES_PER_NODE: usize = flexlight_bvh_gpu::BVH_MAX_CHILDREN;

/// Outward bias applied to every instance's world-space bounding box.
pub const INSTANCE_BIAS: f32 = 1e-6;

/// Number of floats per triangle in a prototype array: three positions,
/// three normals and three uvs.
pub const DEFAULT_PROTOTYPE_STRIDE: usize = 24;

/// Extra levels [`MaxDepth::Auto`] allows on top of `log2(n)`, since straddling
/// elements make real trees deeper than a perfectly balanced one.
const AUTO_DEPTH_SLACK: u32 = 24;

/// Knobs of the tree builders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhConfig {
    pub max_depth: MaxDepth,
    pub order: TraversalOrder,
    pub bias: f32,
    pub prototype_stride: usize,
}

impl BvhConfig {
    pub fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_prototype_stride(mut self, prototype_stride: usize) -> Self {
        self.prototype_stride = prototype_stride;
        self
    }
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_depth: MaxDepth::Auto,
            order: TraversalOrder::DepthFirst,
            bias: 1e-6,
            prototype_stride: DEFAULT_PROTOTYPE_STRIDE,
        }
    }
}

/// Recursion ceiling of the subdivision; past it the builder stops looking
/// for splitting planes and fans the remaining elements out evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaxDepth {
    /// `ceil(log2(n))` plus some slack
    #[default]
    Auto,
    Limited(u32),
    Unbounded,
}

impl MaxDepth {
    pub fn resolve(self, elements: usize) -> u32 {
        match self {
            MaxDepth::Auto => {
                let log2 = elements.max(1).next_power_of_two().trailing_zeros();

                log2 + AUTO_DEPTH_SLACK
            }
            MaxDepth::Limited(depth) => depth,
            MaxDepth::Unbounded => u32::MAX,
        }
    }
}

/// Order in which nodes get their ids and get serialized.
///
/// Both happen in the same order, which is what makes a node's id equal to
/// its row in the serialized arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Pre-order: a node, then its whole first subtree, then the next one
    #[default]
    DepthFirst,

    /// Level by level; nodes of the same depth are contiguous
    BreadthFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_max_depth() {
        assert_eq!(AUTO_DEPTH_SLACK, MaxDepth::Auto.resolve(0));
        assert_eq!(AUTO_DEPTH_SLACK, MaxDepth::Auto.resolve(1));
        assert_eq!(AUTO_DEPTH_SLACK + 3, MaxDepth::Auto.resolve(5));
        assert_eq!(AUTO_DEPTH_SLACK + 3, MaxDepth::Auto.resolve(8));
        assert_eq!(7, MaxDepth::Limited(7).resolve(1000));
        assert_eq!(u32::MAX, MaxDepth::Unbounded.resolve(1000));
    }
}
