//! Chat normalization pipeline.
//!
//! - `catalog`: localization templates loaded from the language file
//! - `normalizer`: JSON chat component to plain text
//! - `colors`: `§` color escape stripping and IRC transcoding
//! - `filter`: relay-worthiness predicate
//! - `pipeline`: the above chained for one inbound message

pub mod catalog;
pub mod colors;
pub mod filter;
pub mod normalizer;
pub mod pipeline;

pub use catalog::LocalizationCatalog;
pub use filter::NoiseFilter;
pub use normalizer::MessageNormalizer;
pub use pipeline::ChatPipeline;
