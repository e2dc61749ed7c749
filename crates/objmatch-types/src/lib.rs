//! Object model for objmatch.
//!
//! Every other objmatch crate depends on `objmatch-types`. It defines what a
//! configuration object looks like to the patch engine: how it serializes,
//! which representation it has, and how its last-applied annotation is read
//! and written.
//!
//! # Key Types
//!
//! - [`ConfigObject`] -- Anything the patch maker can compare and reconstruct
//! - [`Representation`] -- Structured (schema known) or Generic (schemaless)
//! - [`Annotations`] -- Read/write access to the object's annotations
//! - [`Resource`] -- Strongly-typed object built from a [`Kind`] spec
//! - [`DynamicObject`] -- Arbitrary nested JSON mapping
//! - [`TypeMeta`] / [`ObjectMeta`] -- Type and object metadata

pub mod dynamic;
pub mod error;
pub mod meta;
pub mod object;

pub use dynamic::DynamicObject;
pub use error::{TypeError, TypeResult};
pub use meta::{ObjectMeta, TypeMeta};
pub use object::{Annotations, ConfigObject, Kind, Representation, Resource};
