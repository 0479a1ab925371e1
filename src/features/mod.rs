//! Vacancy vectorization: text, categorical and embedding blocks

pub mod artifacts;
pub mod assembler;
pub mod embeddings;
pub mod onehot;
pub mod text;
pub mod tfidf;

pub use artifacts::ArtifactBundle;
pub use assembler::{FeatureAssembler, FeatureBlock, FeatureLayout};
pub use embeddings::{HashingEncoder, SentenceEncoder, StaticEmbeddingEncoder};
pub use onehot::OneHotEncoder;
pub use tfidf::TfidfVectorizer;
