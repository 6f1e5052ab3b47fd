//! TF-IDF embedding backend.
//!
//! Vocabulary is the `max_features` most frequent terms across the corpus
//! (ties broken alphabetically), after lowercasing, splitting on
//! non-alphanumeric characters, and removing English stop words and tokens
//! shorter than `min_token_len`. Terms are word n-grams up to `ngram_max`.
//! Inverse document frequency is smoothed, `ln((1 + n) / (1 + df)) + 1`, and
//! vectors are L2-normalized.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{EmbedError, Embedder, EmbeddingBackend};
use crate::utils::validation::count_to_f64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Maximum vocabulary size
    pub max_features: usize,

    /// Longest word n-gram to index
    pub ngram_max: usize,

    /// Shortest token kept, in characters
    pub min_token_len: usize,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_max: 2,
            min_token_len: 2,
        }
    }
}

/// Backend that fits a [`TfIdfModel`] per corpus
#[derive(Debug, Clone, Default)]
pub struct TfIdfBackend {
    config: TfIdfConfig,
}

impl TfIdfBackend {
    #[must_use]
    pub fn new(config: TfIdfConfig) -> Self {
        Self { config }
    }
}

impl EmbeddingBackend for TfIdfBackend {
    fn name(&self) -> &str {
        "tfidf"
    }

    fn fit(&self, documents: &[String]) -> Result<Box<dyn Embedder>, EmbedError> {
        Ok(Box::new(TfIdfModel::fit(documents, &self.config)?))
    }
}

/// A fitted TF-IDF vocabulary
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    config: TfIdfConfig,
}

impl TfIdfModel {
    /// Fit vocabulary and document frequencies on `documents`
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::EmptyCorpus` if `documents` is empty and
    /// `EmbedError::EmptyVocabulary` if no document yields a term.
    pub fn fit(documents: &[String], config: &TfIdfConfig) -> Result<Self, EmbedError> {
        if documents.is_empty() {
            return Err(EmbedError::EmptyCorpus);
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let terms = analyze(doc, config);
            let mut seen = HashSet::new();
            for term in terms {
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(EmbedError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features.max(1));

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n_docs = count_to_f64(documents.len());
        let idf = terms
            .iter()
            .map(|term| {
                let df = count_to_f64(doc_freq.get(term).copied().unwrap_or(0));
                #[allow(clippy::cast_possible_truncation)]
                let weight = (((1.0 + n_docs) / (1.0 + df)).ln() + 1.0) as f32;
                weight
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        Ok(Self {
            vocabulary,
            idf,
            config: config.clone(),
        })
    }

    /// Number of terms in the vocabulary
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.idf.len()];
        for term in analyze(text, &self.config) {
            if let Some(&i) = self.vocabulary.get(&term) {
                vector[i] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Embedder for TfIdfModel {
    fn dim(&self) -> usize {
        self.idf.len()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.vectorize(text))
    }
}

/// Tokenize and expand to n-grams
fn analyze(text: &str, config: &TfIdfConfig) -> Vec<String> {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= config.min_token_len && !is_stop_word(t))
        .map(str::to_string)
        .collect();

    let mut terms = Vec::with_capacity(tokens.len() * config.ngram_max.max(1));
    terms.extend(tokens.iter().cloned());
    for n in 2..=config.ngram_max {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// English stop words, sorted for binary search
const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "again", "against", "all", "almost", "along", "also",
    "although", "always", "am", "among", "an", "and", "another", "any", "are", "around", "as",
    "at", "be", "became", "because", "become", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
    "during", "each", "either", "else", "enough", "etc", "even", "ever", "every", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "however", "ie", "if", "in", "into", "is", "it", "its",
    "itself", "just", "least", "less", "many", "may", "me", "might", "more", "most", "much",
    "must", "my", "myself", "neither", "no", "nor", "not", "now", "of", "off", "often", "on",
    "once", "only", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "rather", "same", "she", "should", "since", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "therefore", "these", "they", "this", "those", "though", "through", "thus", "to", "too",
    "toward", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "when", "where", "whether", "which", "while", "who", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_stop_words_sorted() {
        assert!(STOP_WORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_analyze_unigrams_and_bigrams() {
        let terms = analyze("The Machine-Learning of robots", &TfIdfConfig::default());
        assert_eq!(
            terms,
            vec![
                "machine",
                "learning",
                "robots",
                "machine learning",
                "learning robots"
            ]
        );
    }

    #[test]
    fn test_analyze_drops_short_tokens() {
        let terms = analyze("a b cd", &TfIdfConfig::default());
        assert_eq!(terms, vec!["cd"]);
    }

    #[test]
    fn test_fit_empty_corpus() {
        let result = TfIdfModel::fit(&[], &TfIdfConfig::default());
        assert!(matches!(result, Err(EmbedError::EmptyCorpus)));
    }

    #[test]
    fn test_fit_empty_vocabulary() {
        let result = TfIdfModel::fit(&docs(&["the and of", "a"]), &TfIdfConfig::default());
        assert!(matches!(result, Err(EmbedError::EmptyVocabulary)));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = TfIdfConfig {
            max_features: 2,
            ngram_max: 1,
            min_token_len: 2,
        };
        let model = TfIdfModel::fit(
            &docs(&["robotics robotics control", "robotics optics control", "zebra"]),
            &config,
        )
        .unwrap();

        assert_eq!(model.vocabulary_size(), 2);
        assert!(model.contains_term("robotics"));
        assert!(model.contains_term("control"));
        assert!(!model.contains_term("optics"));
    }

    #[test]
    fn test_vectors_are_normalized() {
        let model = TfIdfModel::fit(
            &docs(&["quantum optics", "robot control"]),
            &TfIdfConfig::default(),
        )
        .unwrap();
        let v = model.embed("quantum optics lasers").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let model = TfIdfModel::fit(&docs(&["quantum optics"]), &TfIdfConfig::default()).unwrap();
        let v = model.embed("basket weaving").unwrap();
        assert_eq!(v.len(), model.dim());
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_similar_documents_score_higher() {
        let corpus = docs(&[
            "robotics control systems legged robots",
            "protein folding structural biology",
            "quantum optics photonics",
        ]);
        let backend = TfIdfBackend::default();
        let model = backend.fit(&corpus).unwrap();
        let vectors = model.embed_batch(&corpus).unwrap();
        let query = model.embed("legged robots").unwrap();

        let robot = cosine_similarity(&query, &vectors[0]);
        let protein = cosine_similarity(&query, &vectors[1]);
        assert!(robot > 0.0);
        assert!(protein.abs() < f64::EPSILON);
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(TfIdfBackend::default().name(), "tfidf");
    }
}
