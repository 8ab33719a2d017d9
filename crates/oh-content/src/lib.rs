//! Content format resolution for the oxidized-horizon emulator
//!
//! Classifies filesystem paths and caller-provided streams into loadable
//! content sources. Classification is pure: no native core call is ever
//! made from this crate.

pub mod resolver;
pub mod source;

pub use resolver::resolve;
pub use source::{ContentKind, ContentSource, SourceOrigin, StreamFormat};
