//! Last-applied configuration memory for objmatch.
//!
//! The [`Annotator`] stores the configuration a caller last applied as a
//! string annotation on the object itself, and reads it back as the
//! "original" side of the next three-way comparison.
//!
//! # Key Types
//!
//! - [`Annotator`] -- Reads and writes the last-applied annotation
//! - [`AnnotateError`] -- Serialization failures while building the snapshot

pub mod annotator;
pub mod error;

pub use annotator::{Annotator, DEFAULT_ANNOTATION_KEY};
pub use error::{AnnotateError, AnnotateResult};
