mod arena;
mod builder;
mod element;
mod indexed_instance;
mod instance_bvh;
mod serializer;
mod traverse;
mod tree;
mod triangle;
mod triangle_bvh;

pub use self::arena::*;
pub use self::builder::*;
pub use self::element::*;
pub use self::indexed_instance::*;
pub use self::instance_bvh::*;
pub use self::serializer::*;
pub use self::tree::*;
pub use self::triangle::*;
pub use self::triangle_bvh::*;
