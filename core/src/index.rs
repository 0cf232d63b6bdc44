use crate::tokenizer::{token_set, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One indexed document. `text` is everything searchable, already flattened by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self { key: key.into(), text: text.into(), source: source.into(), metadata: BTreeMap::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchResult<'a> {
    pub entry: &'a Entry,
    pub score: f64,
}

/// Whether the weight vectors reflect the current entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexStatus {
    #[default]
    Stale,
    Fresh,
}

/// Sparse TF-IDF weights keyed by token; a missing token has weight 0.
pub type SparseVector = HashMap<String, f64>;

/// In-memory TF-IDF index with cosine ranking.
///
/// Mutations mark the index [`IndexStatus::Stale`]; the next [`HowToIndex::search`]
/// rebuilds every vector from scratch. Collections are expected to stay small.
#[derive(Debug, Default)]
pub struct HowToIndex {
    entries: Vec<Entry>,
    doc_freq: HashMap<String, u32>,
    weights: Vec<SparseVector>,
    norms: Vec<f64>,
    status: IndexStatus,
}

impl HowToIndex {
    pub fn new() -> Self { Self::default() }

    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        Self { entries: entries.into_iter().collect(), ..Self::default() }
    }

    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.status = IndexStatus::Stale;
    }

    pub fn entries(&self) -> &[Entry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn status(&self) -> IndexStatus { self.status }

    /// Number of entries containing `token` at least once, as of the last build.
    pub fn doc_freq(&self, token: &str) -> u32 {
        self.doc_freq.get(token).copied().unwrap_or(0)
    }

    /// Weight vector of entry `i`, as of the last build.
    pub fn weights(&self, i: usize) -> Option<&SparseVector> { self.weights.get(i) }

    /// Euclidean norm of entry `i` (1.0 when the vector is all zeros), as of the last build.
    pub fn norm(&self, i: usize) -> Option<f64> { self.norms.get(i).copied() }

    /// Recompute document frequencies, weight vectors and norms for every entry.
    pub fn build(&mut self) {
        self.doc_freq.clear();
        self.weights.clear();
        self.norms.clear();

        for entry in &self.entries {
            for token in token_set(&entry.text) {
                *self.doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        let n = self.entries.len();
        for entry in &self.entries {
            let vector = weigh(&tokenize(&entry.text), &self.doc_freq, n);
            self.norms.push(smoothed_norm(&vector));
            self.weights.push(vector);
        }

        self.status = IndexStatus::Fresh;
        tracing::debug!(entries = n, vocabulary = self.doc_freq.len(), "built how-to index");
    }

    /// Rank every entry against `query` by cosine similarity and keep the best `top_k`.
    ///
    /// Blank queries return nothing without touching the index. Ties keep insertion order.
    pub fn search(&mut self, query: &str, top_k: usize) -> Vec<SearchResult<'_>> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        if self.status == IndexStatus::Stale {
            self.build();
        }
        if self.entries.is_empty() {
            return Vec::new();
        }

        let query_vec = weigh(&tokenize(query), &self.doc_freq, self.entries.len().max(1));
        let query_norm = smoothed_norm(&query_vec);

        let mut results: Vec<SearchResult<'_>> = self
            .entries
            .iter()
            .zip(self.weights.iter().zip(&self.norms))
            .map(|(entry, (weights, &norm))| {
                let score = if norm == 0.0 { 0.0 } else { dot(&query_vec, weights) / (query_norm * norm) };
                SearchResult { entry, score }
            })
            .collect();

        // stable: equal scores keep insertion order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        tracing::debug!(query, hits = results.len(), "searched how-to index");
        results
    }
}

/// `(count / len) * ln((1 + n) / (1 + df))` for each distinct token.
fn weigh(tokens: &[String], doc_freq: &HashMap<String, u32>, n: usize) -> SparseVector {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let len = tokens.len() as f64;
    counts
        .into_iter()
        .map(|(token, count)| {
            let df = doc_freq.get(token).copied().unwrap_or(0);
            let idf = ((1 + n) as f64 / (1 + df) as f64).ln();
            (token.to_string(), (count as f64 / len) * idf)
        })
        .collect()
}

fn smoothed_norm(vector: &SparseVector) -> f64 {
    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm == 0.0 { 1.0 } else { norm }
}

/// Sparse dot product driven by the query's terms.
fn dot(query: &SparseVector, doc: &SparseVector) -> f64 {
    query.iter().map(|(token, q)| q * doc.get(token).copied().unwrap_or(0.0)).sum()
}
