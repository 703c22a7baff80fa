pub mod scoring;

pub use scoring::{HitEntry, SimilarityRanker};
