use std::fmt;

use crate::corpus::store::LabCorpus;
use crate::embedding::{
    cosine_similarity, lab_composite, EmbedError, Embedder, EmbeddingBackend, FieldEmphasis,
};

/// Vector index over a corpus, aligned with the corpus by position.
///
/// Also caches each lab's normalized keyword list for lexical matching.
pub struct LabIndex {
    embedder: Box<dyn Embedder>,
    vectors: Vec<Vec<f32>>,
    terms: Vec<Vec<String>>,
}

impl LabIndex {
    /// Fit `backend` on the corpus composites and embed every lab
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::EmptyCorpus` for an empty corpus, or any error
    /// from fitting or embedding.
    pub fn build(
        corpus: &LabCorpus,
        backend: &dyn EmbeddingBackend,
        emphasis: &FieldEmphasis,
    ) -> Result<Self, EmbedError> {
        if corpus.is_empty() {
            return Err(EmbedError::EmptyCorpus);
        }

        let composites: Vec<String> = corpus
            .labs()
            .iter()
            .map(|lab| lab_composite(lab, emphasis))
            .collect();

        let embedder = backend.fit(&composites)?;
        let vectors = embedder.embed_batch(&composites)?;
        if vectors.len() != composites.len() {
            return Err(EmbedError::Backend(format!(
                "expected {} vectors, got {}",
                composites.len(),
                vectors.len()
            )));
        }
        let dim = embedder.dim();
        if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
            return Err(EmbedError::Backend(format!(
                "vector length {} does not match dimension {dim}",
                v.len()
            )));
        }

        let terms = corpus.labs().iter().map(|lab| lab.keyword_list()).collect();

        Ok(Self {
            embedder,
            vectors,
            terms,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    /// Embed query text in the index's vector space
    ///
    /// # Errors
    ///
    /// Propagates backend failures and rejects vectors of the wrong length.
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vector = self.embedder.embed(text)?;
        if vector.len() != self.dim() {
            return Err(EmbedError::Backend(format!(
                "query vector length {} does not match dimension {}",
                vector.len(),
                self.dim()
            )));
        }
        Ok(vector)
    }

    /// Cosine similarity of `query` against every lab, by position
    #[must_use]
    pub fn similarities(&self, query: &[f32]) -> Vec<f64> {
        self.vectors
            .iter()
            .map(|v| cosine_similarity(query, v))
            .collect()
    }

    /// Normalized keywords of the lab at `position`
    #[must_use]
    pub fn lab_terms(&self, position: usize) -> &[String] {
        self.terms.get(position).map_or(&[][..], Vec::as_slice)
    }
}

impl fmt::Debug for LabIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabIndex")
            .field("labs", &self.len())
            .field("dim", &self.dim())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lab::Lab;
    use crate::embedding::TfIdfBackend;

    fn corpus() -> LabCorpus {
        let (corpus, _) = LabCorpus::from_labs([
            Lab::new("a-1", "Robot Lab").with_keywords("robotics, control"),
            Lab::new("a-2", "Optics Lab").with_keywords("quantum optics, lasers"),
        ]);
        corpus
    }

    #[test]
    fn test_build_aligns_with_corpus() {
        let index =
            LabIndex::build(&corpus(), &TfIdfBackend::default(), &FieldEmphasis::default())
                .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lab_terms(1), ["quantum optics", "lasers"]);
        assert!(index.lab_terms(5).is_empty());
    }

    #[test]
    fn test_build_empty_corpus() {
        let result = LabIndex::build(
            &LabCorpus::new(),
            &TfIdfBackend::default(),
            &FieldEmphasis::default(),
        );
        assert!(matches!(result, Err(EmbedError::EmptyCorpus)));
    }

    #[test]
    fn test_similarities_by_position() {
        let index =
            LabIndex::build(&corpus(), &TfIdfBackend::default(), &FieldEmphasis::default())
                .unwrap();
        let query = index.embed_query("lasers").unwrap();
        let sims = index.similarities(&query);
        assert!(sims[1] > sims[0]);
    }
}
