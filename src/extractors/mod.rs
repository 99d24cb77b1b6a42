// src/extractors/mod.rs
pub mod blocks;
pub mod engine;
pub mod grand_total;
pub mod normalize;
pub mod numbers;
pub mod period;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use blocks::{BlockLocator, BlockMatch, LocatorConfig};
#[allow(unused_imports)]
pub use engine::ReportExtractor;
#[allow(unused_imports)]
pub use normalize::NormalizedText;
