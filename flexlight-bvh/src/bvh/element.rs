use crate::BoundingBox;

/// Something that can be stored in a tree's leaves.
pub trait BvhElement {
    /// External id of the element, written into the serialized leaf rows.
    fn id(&self) -> u32;

    /// Tight bounding box of the element.
    fn bounds(&self) -> BoundingBox;

    /// Returns whether all of the element's geometry is finite.
    fn is_finite(&self) -> bool;
}

impl<T> BvhElement for &T
where
    T: BvhElement,
{
    fn id(&self) -> u32 {
        T::id(self)
    }

    fn bounds(&self) -> BoundingBox {
        T::bounds(self)
    }

    fn is_finite(&self) -> bool {
        T::is_finite(self)
    }
}

/// Folds all elements into a single box; empty input yields an empty box.
pub fn tighten<T>(elements: &[T]) -> BoundingBox
where
    T: BvhElement,
{
    elements.iter().map(BvhElement::bounds).collect()
}

/// Returns whether every point of `element` lies within `bounds`.
pub fn is_element_contained<T>(
    element: &T,
    bounds: &BoundingBox,
    bias: f32,
) -> bool
where
    T: BvhElement,
{
    bounds.contains_box(&element.bounds(), bias)
}
