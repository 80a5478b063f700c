use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::model::SourceRecord;
use crate::tokenizer::tokenize;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub type TermId = u32;

/// A record as seen by the index: its corpus text and TF-IDF weights, one
/// per vocabulary term in vocabulary order.
#[derive(Debug)]
pub struct IndexedDocument<R> {
    pub id: String,
    pub corpus_text: String,
    pub weights: Vec<f64>,
    norm: f64,
    source: Arc<R>,
}

impl<R> IndexedDocument<R> {
    pub fn source(&self) -> &Arc<R> { &self.source }
    pub fn norm(&self) -> f64 { self.norm }
}

#[derive(Debug, Clone)]
pub struct ScoredRecord<R> {
    pub record: Arc<R>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
}

/// In-memory TF-IDF index over a batch of records.
///
/// The only mutation is [`RetrievalIndex::load`], which replaces every piece
/// of state at once. Use [`SharedIndex`] when searches and reloads happen on
/// different threads.
#[derive(Debug)]
pub struct RetrievalIndex<R> {
    config: IndexConfig,
    dictionary: HashMap<String, TermId>,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    docs: Vec<IndexedDocument<R>>,
}

impl<R> Default for RetrievalIndex<R> {
    fn default() -> Self { Self::new(IndexConfig::default()) }
}

impl<R> RetrievalIndex<R> {
    pub fn new(config: IndexConfig) -> Self {
        Self { config, dictionary: HashMap::new(), vocabulary: Vec::new(), idf: Vec::new(), docs: Vec::new() }
    }

    pub fn config(&self) -> &IndexConfig { &self.config }
    pub fn len(&self) -> usize { self.docs.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Terms in vector position order.
    pub fn vocabulary(&self) -> &[String] { &self.vocabulary }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    /// `None` for anything outside the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_id(term).map(|tid| self.idf[tid as usize])
    }

    pub fn documents(&self) -> &[IndexedDocument<R>] { &self.docs }

    /// First document carrying `id`, in ingestion order.
    pub fn get(&self, id: &str) -> Option<&IndexedDocument<R>> {
        self.docs.iter().find(|d| d.id == id)
    }

    /// All indexed records in ingestion order.
    pub fn records(&self) -> Vec<Arc<R>> {
        self.docs.iter().map(|d| d.source.clone()).collect()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats { num_docs: self.docs.len(), num_terms: self.vocabulary.len() }
    }

    /// Weight vector for `text` over the current vocabulary and IDF table.
    /// Tokens outside the vocabulary still count towards the token total.
    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        let tokens = tokenize(text);
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for term in &tokens {
            if let Some(&tid) = self.dictionary.get(term) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        weight_vector(&counts, tokens.len(), &self.idf)
    }

    /// Every document scored against `query`, best first. Ties keep
    /// ingestion order. Nothing is filtered out.
    pub fn rank(&self, query: &str) -> Vec<ScoredRecord<R>> {
        if self.docs.is_empty() {
            return Vec::new();
        }
        let q = self.vectorize(query);
        let q_norm = l2_norm(&q);
        let mut scored: Vec<ScoredRecord<R>> = self
            .docs
            .iter()
            .map(|d| ScoredRecord { record: d.source.clone(), score: cosine_with_norms(&q, q_norm, &d.weights, d.norm) })
            .collect();
        // sort_by is stable, so equal scores stay in ingestion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Up to `top_k` records scoring strictly above the configured threshold.
    pub fn search_scored(&self, query: &str, top_k: usize) -> Vec<ScoredRecord<R>> {
        let min = self.config.min_similarity;
        let hits: Vec<ScoredRecord<R>> = self.rank(query).into_iter().filter(|s| s.score > min).take(top_k).collect();
        tracing::debug!(query, top_k, hits = hits.len(), "search");
        hits
    }

    pub fn search(&self, query: &str, top_k: usize) -> Vec<Arc<R>> {
        self.search_scored(query, top_k).into_iter().map(|s| s.record).collect()
    }

    /// [`Self::search`] with `default_top_k` from the config.
    pub fn search_default(&self, query: &str) -> Vec<Arc<R>> {
        self.search(query, self.config.default_top_k)
    }
}

impl<R: SourceRecord> RetrievalIndex<R> {
    /// Build an index from scratch. Fails without side effects when any
    /// record has a blank id or body.
    pub fn build<I>(records: I, config: IndexConfig) -> Result<Self, IndexError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let start = Instant::now();
        let records: Vec<Arc<R>> = records.into_iter().map(Into::into).collect();
        for (position, record) in records.iter().enumerate() {
            if record.id().trim().is_empty() {
                return Err(IndexError::MissingId { position });
            }
            if record.body().trim().is_empty() {
                return Err(IndexError::MissingBody { id: record.id().to_string(), position });
            }
        }

        // Tokenize each document once; vocabulary, df and vectors all come
        // from these cached counts.
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut vocabulary: Vec<String> = Vec::new();
        let mut df: Vec<u32> = Vec::new();
        let mut cached: Vec<(String, usize, HashMap<TermId, u32>)> = Vec::with_capacity(records.len());
        for record in &records {
            let corpus_text = record.corpus_text();
            let tokens = tokenize(&corpus_text);
            let mut counts: HashMap<TermId, u32> = HashMap::new();
            for term in &tokens {
                let tid = match dictionary.get(term) {
                    Some(&tid) => tid,
                    None => {
                        let tid = vocabulary.len() as TermId;
                        dictionary.insert(term.clone(), tid);
                        vocabulary.push(term.clone());
                        df.push(0);
                        tid
                    }
                };
                let count = counts.entry(tid).or_insert(0);
                if *count == 0 {
                    df[tid as usize] += 1;
                }
                *count += 1;
            }
            cached.push((corpus_text, tokens.len(), counts));
        }

        let num_docs = records.len();
        let idf: Vec<f64> = df.iter().map(|&d| config.idf.weight(num_docs, d as usize)).collect();

        let docs: Vec<IndexedDocument<R>> = records
            .into_iter()
            .zip(cached)
            .map(|(source, (corpus_text, num_tokens, counts))| {
                let weights = weight_vector(&counts, num_tokens, &idf);
                let norm = l2_norm(&weights);
                IndexedDocument { id: source.id().to_string(), corpus_text, weights, norm, source }
            })
            .collect();

        tracing::info!(
            num_docs,
            num_terms = vocabulary.len(),
            idf = %config.idf,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "retrieval index built"
        );
        Ok(Self { config, dictionary, vocabulary, idf, docs })
    }

    /// Replace the whole corpus. On error the current state is kept.
    pub fn load<I>(&mut self, records: I) -> Result<IndexStats, IndexError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let next = Self::build(records, self.config.clone())?;
        *self = next;
        Ok(self.stats())
    }
}

fn weight_vector(counts: &HashMap<TermId, u32>, num_tokens: usize, idf: &[f64]) -> Vec<f64> {
    let mut v = vec![0.0; idf.len()];
    if num_tokens == 0 {
        return v;
    }
    let n = num_tokens as f64;
    for (&tid, &count) in counts {
        let tid = tid as usize;
        v[tid] = (count as f64 / n) * idf[tid];
    }
    v
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|w| w * w).sum::<f64>().sqrt()
}

fn cosine_with_norms(a: &[f64], norm_a: f64, b: &[f64], norm_b: f64) -> f64 {
    if a.len() != b.len() || norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() { sim } else { 0.0 }
}

/// Cosine of the angle between `a` and `b`; 0 when either is the zero
/// vector or the lengths differ.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

/// Thread-safe handle that swaps whole index snapshots.
///
/// Searches run against an `Arc` of the snapshot taken under a short read
/// lock, so they always see a single consistent build. Rebuilds are
/// serialized by `rebuild`; a later publish never carries an older corpus
/// than an earlier one when callers go through [`SharedIndex::reload_with`].
#[derive(Debug)]
pub struct SharedIndex<R> {
    current: RwLock<Arc<RetrievalIndex<R>>>,
    rebuild: Mutex<()>,
}

impl<R> Default for SharedIndex<R> {
    fn default() -> Self { Self::new(IndexConfig::default()) }
}

impl<R> SharedIndex<R> {
    pub fn new(config: IndexConfig) -> Self {
        Self { current: RwLock::new(Arc::new(RetrievalIndex::new(config))), rebuild: Mutex::new(()) }
    }

    pub fn snapshot(&self) -> Arc<RetrievalIndex<R>> { self.current.read().clone() }

    pub fn search(&self, query: &str, top_k: usize) -> Vec<Arc<R>> { self.snapshot().search(query, top_k) }

    pub fn search_scored(&self, query: &str, top_k: usize) -> Vec<ScoredRecord<R>> {
        self.snapshot().search_scored(query, top_k)
    }

    pub fn search_default(&self, query: &str) -> Vec<Arc<R>> { self.snapshot().search_default(query) }

    pub fn stats(&self) -> IndexStats { self.snapshot().stats() }
}

impl<R: SourceRecord> SharedIndex<R> {
    /// Build a new snapshot outside the read/write lock, then publish it.
    pub fn load<I>(&self, records: I) -> Result<IndexStats, IndexError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let _guard = self.rebuild.lock();
        self.publish(records)
    }

    /// Like [`SharedIndex::load`], but `source` is read while the rebuild
    /// lock is held, so the fetch, build and swap of concurrent reloads
    /// happen one at a time.
    pub fn reload_with<F, I>(&self, source: F) -> Result<IndexStats, IndexError>
    where
        F: FnOnce() -> I,
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let _guard = self.rebuild.lock();
        self.publish(source())
    }

    fn publish<I>(&self, records: I) -> Result<IndexStats, IndexError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let config = self.snapshot().config().clone();
        let next = RetrievalIndex::build(records, config)?;
        let stats = next.stats();
        *self.current.write() = Arc::new(next);
        Ok(stats)
    }
}
