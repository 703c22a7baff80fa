pub mod normalizer;
pub mod stopwords;

pub use normalizer::TextNormalizer;
pub use stopwords::{Language, StopWords};
