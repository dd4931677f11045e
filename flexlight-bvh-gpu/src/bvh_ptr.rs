/// Index of a row inside the serialized arrays.
///
/// Because node ids are assigned in the same order the tree gets serialized,
/// a node's id is also its `BvhPtr`.
#[derive(Copy, Clone)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq, Eq))]
pub struct BvhPtr(u32);

impl BvhPtr {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn root() -> Self {
        Self::new(0)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Rebases a tree-local pointer onto a buffer where the tree starts at
    /// row `offset`.
    pub fn offset(self, offset: u32) -> Self {
        Self(self.0 + offset)
    }
}
