//! CPU-side construction and flattening of bounding volume hierarchies for
//! FlexLight's GPU path tracer.
//!
//! Two kinds of trees get built here: static per-mesh trees over triangles
//! ([`TriangleBvh`]) and per-scene trees over transformed instances
//! ([`IndexedInstanceBvh`]). Both serialize into [`BvhArrays`], whose row
//! layout is described by [`gpu`].

#![allow(clippy::len_without_is_empty)]

mod bvh;
mod config;
mod error;
mod utils;

pub use flexlight_bvh_gpu as gpu;

pub use self::bvh::*;
pub use self::config::*;
pub use self::error::*;
pub use self::utils::*;
