use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported while building a tree.
///
/// Partition defects are not reported here: they indicate a bug in the
/// builder and abort with a panic instead.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Element's geometry contains NaN or infinity
    #[error("element #{id} has non-finite geometry")]
    NonFiniteElement { id: u32 },

    /// Prototype array doesn't consist of whole triangle records
    #[error(
        "prototype array of length {len} is not a multiple of the stride ({stride})"
    )]
    MalformedPrototype { len: usize, stride: usize },

    /// Prototype stride too small to hold three vertex positions
    #[error("prototype stride {stride} is smaller than 9")]
    InvalidStride { stride: usize },

    /// Element uses the id that marks empty slots of serialized rows
    #[error("element id {id} is reserved")]
    ReservedElementId { id: u32 },

    /// Serialized arrays don't consist of the same number of whole rows
    #[error(
        "malformed arrays: {bvh} bvh values vs {bounding_vertices} bounding values"
    )]
    MalformedArrays {
        bvh: usize,
        bounding_vertices: usize,
    },

    /// Element ids wouldn't fit in the serialized 32-bit slots
    #[error("cannot index {count} elements")]
    TooManyElements { count: usize },
}
