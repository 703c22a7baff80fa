pub mod vector;

pub use vector::TermVector;
