use std::iter;

use crate::gpu::BVH_NO_CHILD;
use crate::{
    is_element_contained, measure, tighten, Axis, BoundingBox, Bvh, BvhConfig,
    BvhElement, BvhLeaf, BvhNode, BvhTree, Error, Result, TraversalOrder,
    BVH_MAX_LEAVES_PER_NODE,
};

/// How the builder picks the axis to split a node along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Always the axis with the largest extent; cheap and deterministic, used
    /// for static meshes.
    LongestAxis,

    /// The axis minimizing `straddling + |below - above|`, i.e. the one giving
    /// the most balanced split with the fewest straddling elements; used for
    /// instances, whose count is small but whose boxes often overlap.
    MinimalStraddle,
}

/// Builds trees by recursive midpoint subdivision.
///
/// Every node gets split at the center of its bounding box along an axis
/// chosen by [`SplitStrategy`]; its elements are then grouped into those
/// below the plane, those straddling it and those above it, and each
/// non-empty group becomes a subtree.
#[derive(Clone, Copy, Debug)]
pub struct BvhBuilder {
    strategy: SplitStrategy,
    config: BvhConfig,
}

impl BvhBuilder {
    pub fn new(strategy: SplitStrategy) -> Self {
        Self {
            strategy,
            config: Default::default(),
        }
    }

    pub fn with_config(mut self, config: BvhConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    pub fn build<T>(&self, elements: Vec<T>) -> Result<Bvh<T>>
    where
        T: BvhElement,
    {
        if u32::try_from(elements.len()).is_err() {
            return Err(Error::TooManyElements {
                count: elements.len(),
            });
        }

        for element in &elements {
            if !element.is_finite() {
                return Err(Error::NonFiniteElement { id: element.id() });
            }

            if element.id() == BVH_NO_CHILD {
                return Err(Error::ReservedElementId { id: element.id() });
            }
        }

        log::info!(
            "Building BVH; elements = {}, strategy = {:?}",
            elements.len(),
            self.strategy
        );

        let len = elements.len();

        let mut root = measure("bvh-build", || {
            let mut ctxt = BuildContext {
                strategy: self.strategy,
                bias: self.config.bias,
                max_depth: self.config.max_depth.resolve(len),
                next_id: 0,
            };

            ctxt.subdivide(elements, 0)
        });

        // Ids come out of the build in depth-first pre-order already
        if self.config.order == TraversalOrder::BreadthFirst {
            root.renumber(self.config.order);
        }

        let bvh = Bvh {
            root,
            order: self.config.order,
        };

        if cfg!(debug_assertions) {
            bvh.validate(self.config.bias);
        }

        log::info!(
            "BVH built; nodes = {}, depth = {}",
            bvh.len(),
            bvh.depth()
        );

        Ok(bvh)
    }
}

struct BuildContext {
    strategy: SplitStrategy,
    bias: f32,
    max_depth: u32,
    next_id: u32,
}

impl BuildContext {
    fn subdivide<T>(&mut self, elements: Vec<T>, depth: u32) -> BvhTree<T>
    where
        T: BvhElement,
    {
        if elements.len() <= BVH_MAX_LEAVES_PER_NODE {
            return self.leaf(elements);
        }

        if depth > self.max_depth {
            log::debug!(
                "Reached maximum depth ({}); fanning out {} elements",
                self.max_depth,
                elements.len()
            );

            return self.fan_out(elements);
        }

        let bounds = tighten(&elements);

        let Some(axis) = self.choose_axis(&elements, &bounds) else {
            log::warn!(
                "No spatial subdivision possible for {} elements",
                elements.len()
            );

            return self.fan_out(elements);
        };

        let [below, straddling, above] =
            Split::new(&bounds, axis, self.bias).partition(elements);

        let id = self.alloc_id();

        let children: Vec<_> = [below, straddling, above]
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| self.subdivide(group, depth + 1))
            .collect();

        self.node(id, children)
    }

    /// Builds a subtree ignoring geometry, cutting `elements` into up to
    /// [`BVH_MAX_LEAVES_PER_NODE`] contiguous chunks of `ceil(n / 4)` items.
    ///
    /// Used when no splitting plane can make progress; every chunk is strictly
    /// smaller than its parent, so this always terminates.
    fn fan_out<T>(&mut self, mut elements: Vec<T>) -> BvhTree<T>
    where
        T: BvhElement,
    {
        if elements.len() <= BVH_MAX_LEAVES_PER_NODE {
            return self.leaf(elements);
        }

        let id = self.alloc_id();
        let chunk_len = elements.len().div_ceil(BVH_MAX_LEAVES_PER_NODE);
        let mut chunks = Vec::with_capacity(BVH_MAX_LEAVES_PER_NODE);

        while !elements.is_empty() {
            let rest = elements.split_off(chunk_len.min(elements.len()));

            chunks.push(elements);
            elements = rest;
        }

        let children = chunks
            .into_iter()
            .map(|chunk| self.fan_out(chunk))
            .collect();

        self.node(id, children)
    }

    fn choose_axis<T>(&self, elements: &[T], bounds: &BoundingBox) -> Option<Axis>
    where
        T: BvhElement,
    {
        match self.strategy {
            SplitStrategy::LongestAxis => {
                let longest = bounds.longest_axis();

                // Long, thin elements (e.g. a tube's sides) may all cross the
                // longest axis' midpoint while another axis separates them
                iter::once(longest)
                    .chain(Axis::all().filter(|axis| *axis != longest))
                    .find(|axis| {
                        Split::new(bounds, *axis, self.bias)
                            .cost(elements)
                            .is_some()
                    })
            }

            SplitStrategy::MinimalStraddle => {
                let mut best: Option<(Axis, usize)> = None;

                for axis in Axis::all() {
                    let split = Split::new(bounds, axis, self.bias);

                    let Some(cost) = split.cost(elements) else {
                        continue;
                    };

                    // Strict comparison, so that ties go to the earlier axis
                    if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                        best = Some((axis, cost));
                    }
                }

                best.map(|(axis, _)| axis)
            }
        }
    }

    fn leaf<T>(&mut self, elements: Vec<T>) -> BvhTree<T>
    where
        T: BvhElement,
    {
        BvhTree::Leaf(BvhLeaf {
            bounds: tighten(&elements),
            children: elements,
            id: self.alloc_id(),
        })
    }

    fn node<T>(&mut self, id: u32, children: Vec<BvhTree<T>>) -> BvhTree<T> {
        assert!(!children.is_empty());

        BvhTree::Node(BvhNode {
            bounds: children.iter().map(BvhTree::bounds).collect(),
            children,
            id,
        })
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;

        self.next_id += 1;
        id
    }
}

/// Bounding box cut in half by an axis-aligned plane through its center.
#[derive(Clone, Copy, Debug)]
struct Split {
    bounds: BoundingBox,
    below: BoundingBox,
    above: BoundingBox,
    bias: f32,
}

impl Split {
    fn new(bounds: &BoundingBox, axis: Axis, bias: f32) -> Self {
        let (below, above) = bounds.split(axis, bounds.center()[axis]);

        Self {
            bounds: *bounds,
            below,
            above,
            bias,
        }
    }

    fn classify<T>(&self, element: &T) -> Side
    where
        T: BvhElement,
    {
        let in_below = is_element_contained(element, &self.below, self.bias);
        let in_above = is_element_contained(element, &self.above, self.bias);

        match (in_below, in_above) {
            (true, false) => Side::Below,
            (false, true) => Side::Above,

            // Either lies on the plane or crosses it
            _ => {
                assert!(
                    is_element_contained(element, &self.bounds, self.bias),
                    "element #{} lies outside of the box being split ({:?})",
                    element.id(),
                    self.bounds,
                );

                Side::Straddling
            }
        }
    }

    /// Splits `elements` into `[below, straddling, above]`, preserving their
    /// relative order.
    fn partition<T>(&self, elements: Vec<T>) -> [Vec<T>; 3]
    where
        T: BvhElement,
    {
        let mut groups = [Vec::new(), Vec::new(), Vec::new()];

        for element in elements {
            groups[self.classify(&element) as usize].push(element);
        }

        groups
    }

    /// Returns `straddling + |below - above|`, or `None` if one group would
    /// take all of the elements (so the split makes no progress).
    ///
    /// Classification is deterministic, so a split with some cost is
    /// guaranteed to leave at least two groups non-empty in
    /// [`Self::partition()`].
    fn cost<T>(&self, elements: &[T]) -> Option<usize>
    where
        T: BvhElement,
    {
        let mut counts = [0; 3];

        for element in elements {
            counts[self.classify(element) as usize] += 1;
        }

        if counts.contains(&elements.len()) {
            return None;
        }

        let [below, straddling, above] = counts;

        Some(straddling + below.abs_diff(above))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Below = 0,
    Straddling = 1,
    Above = 2,
}
