//! Hybrid retrieval engine: dense-vector search, lexical search, their
//! Reciprocal-Rank-Fusion combination, and post-retrieval neighbor-chunk
//! expansion.
//!
//! This is C9 through C12 of the retrieval subsystem. Each piece wraps an
//! `inkwell_store::ChunkStoreBackend`; none of them own storage.

mod error;
mod fusion;
mod lexical;
mod model;
mod neighbors;
mod vector;

pub use error::{RetrievalError, Result};
pub use fusion::{HybridSearch, HybridSearchOptions};
pub use lexical::LexicalSearch;
pub use model::{HybridResult, LexicalHit, SearchFilters, VectorHit};
pub use neighbors::NeighborExpander;
pub use vector::VectorSearch;
