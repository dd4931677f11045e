use crate::{
    Bvh, BvhArrays, BvhBuilder, BvhConfig, Error, IndexedInstance, Result,
    SceneInstance, SplitStrategy,
};

/// Per-scene tree over the world-space bounding boxes of all instances.
///
/// Instances get ids in the order they're provided, starting at zero; leaves
/// of the serialized tree reference instances by those ids.
#[derive(Clone, Debug)]
pub struct IndexedInstanceBvh<I> {
    bvh: Bvh<IndexedInstance<I>>,
    len: usize,
}

impl<I> IndexedInstanceBvh<I>
where
    I: SceneInstance,
{
    pub fn from_instances(
        instances: impl IntoIterator<Item = I>,
    ) -> Result<Self> {
        Self::from_instances_with(instances, Default::default())
    }

    pub fn from_instances_with(
        instances: impl IntoIterator<Item = I>,
        config: BvhConfig,
    ) -> Result<Self> {
        let instances = instances
            .into_iter()
            .enumerate()
            .map(|(id, instance)| {
                let id = u32::try_from(id)
                    .map_err(|_| Error::TooManyElements { count: id })?;

                Ok(IndexedInstance::new(instance, id))
            })
            .collect::<Result<Vec<_>>>()?;

        let len = instances.len();

        let bvh = BvhBuilder::new(SplitStrategy::MinimalStraddle)
            .with_config(config)
            .build(instances)?;

        Ok(Self { bvh, len })
    }
}

impl<I> IndexedInstanceBvh<I> {
    /// Looks the instance up in the tree's leaves; linear in the number of
    /// instances.
    pub fn instance(&self, id: u32) -> Option<&IndexedInstance<I>> {
        if id as usize >= self.len {
            return None;
        }

        self.bvh.elements().find(|instance| instance.id == id)
    }

    /// Returns all instances, in the tree's order.
    pub fn instances(&self) -> impl Iterator<Item = &IndexedInstance<I>> + '_ {
        self.bvh.elements()
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bvh(&self) -> &Bvh<IndexedInstance<I>> {
        &self.bvh
    }

    pub fn into_bvh(self) -> Bvh<IndexedInstance<I>> {
        self.bvh
    }

    pub fn to_arrays(&self) -> BvhArrays {
        self.bvh.to_arrays()
    }
}
