//! Text embedding for the vector similarity signal.
//!
//! An [`EmbeddingBackend`] is fit once per corpus and yields an [`Embedder`]
//! that maps both lab composites and queries into the same vector space. The
//! built-in backend is [`tfidf::TfIdfBackend`]: a sparse term-frequency /
//! inverse-document-frequency model over unigrams and bigrams, stored densely
//! because corpora are small (hundreds of labs, at most a few thousand terms).
//!
//! Lab and query texts are built by [`composite`] with field-specific
//! emphasis, realized by repeating each field's text.

use thiserror::Error;

pub mod composite;
pub mod tfidf;

pub use composite::{lab_composite, query_composite, FieldEmphasis};
pub use tfidf::{TfIdfBackend, TfIdfConfig, TfIdfModel};

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Cannot fit an embedding model on an empty corpus")]
    EmptyCorpus,

    #[error("Corpus produced an empty vocabulary")]
    EmptyVocabulary,

    #[error("Embedding backend failed: {0}")]
    Backend(String),
}

/// Produces vectors for texts in a fixed space
pub trait Embedder: Send + Sync {
    /// Vector length
    fn dim(&self) -> usize;

    /// Embed a single text
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::Backend` if the backend cannot produce a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed several texts, in order
    ///
    /// # Errors
    ///
    /// Fails if any single text fails.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Fits an [`Embedder`] to a corpus of documents
pub trait EmbeddingBackend: Send + Sync {
    /// Short identifier reported by health checks
    fn name(&self) -> &str;

    /// Fit on the corpus composites
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::EmptyCorpus` when `documents` is empty, or any
    /// backend-specific failure.
    fn fit(&self, documents: &[String]) -> Result<Box<dyn Embedder>, EmbedError>;
}

/// Cosine similarity of two vectors; 0.0 if either has zero norm or lengths differ
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]) - 0.5f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f64::EPSILON);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f64::EPSILON);
        assert!(cosine_similarity(&[], &[]).abs() < f64::EPSILON);
    }
}
