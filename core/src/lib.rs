//! Knowledge-base retrieval for the hotel concierge: a small TF-IDF index
//! over asset records plus the shared domain model.

pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod tokenizer;

pub use config::{IdfWeighting, IndexConfig};
pub use error::IndexError;
pub use index::{cosine_similarity, IndexStats, IndexedDocument, RetrievalIndex, ScoredRecord, SharedIndex, TermId};
pub use model::{Asset, NewAsset, SourceRecord};
