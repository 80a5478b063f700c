use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How inverse document frequency is derived from document counts.
///
/// `Classic` reproduces the formula the concierge service has always used.
/// `Smoothed` is the default: it stays positive, so small corpora such as a
/// two-document pool still rank matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfWeighting {
    /// `ln(N / (df + 1))`. Zero or negative for any term once a corpus is
    /// small enough that `df + 1 >= N`.
    Classic,
    /// `ln(1 + N / df)`, always positive.
    #[default]
    Smoothed,
}

impl IdfWeighting {
    pub fn weight(self, num_docs: usize, doc_freq: usize) -> f64 {
        let n = num_docs as f64;
        match self {
            IdfWeighting::Classic => (n / (doc_freq as f64 + 1.0)).ln(),
            IdfWeighting::Smoothed => (1.0 + n / doc_freq.max(1) as f64).ln(),
        }
    }
}

impl fmt::Display for IdfWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdfWeighting::Classic => f.write_str("classic"),
            IdfWeighting::Smoothed => f.write_str("smoothed"),
        }
    }
}

impl FromStr for IdfWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(IdfWeighting::Classic),
            "smoothed" => Ok(IdfWeighting::Smoothed),
            other => Err(format!("unknown idf weighting '{other}', expected 'classic' or 'smoothed'")),
        }
    }
}

/// Tunables for ranking. Every field falls back to its default when missing
/// from a deserialized config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Results must score strictly above this cosine similarity.
    pub min_similarity: f64,
    /// Result count used by `search_default`.
    pub default_top_k: usize,
    pub idf: IdfWeighting,
}

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.1;
pub const DEFAULT_TOP_K: usize = 5;

impl Default for IndexConfig {
    fn default() -> Self {
        Self { min_similarity: DEFAULT_MIN_SIMILARITY, default_top_k: DEFAULT_TOP_K, idf: IdfWeighting::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_matches_formula() {
        let w = IdfWeighting::Classic.weight(5, 1);
        assert!((w - (5.0f64 / 2.0).ln()).abs() < 1e-12);
        // a term in one of two documents carries no weight
        assert_eq!(IdfWeighting::Classic.weight(2, 1), 0.0);
    }

    #[test]
    fn smoothed_is_the_default() {
        assert_eq!(IdfWeighting::default(), IdfWeighting::Smoothed);
        assert_eq!(IndexConfig::default().idf, IdfWeighting::Smoothed);
        // where classic zeroes a term, smoothed still weights it
        assert!(IdfWeighting::Smoothed.weight(2, 1) > 0.0);
    }

    #[test]
    fn smoothed_is_positive() {
        for df in 1..=10 {
            assert!(IdfWeighting::Smoothed.weight(10, df) > 0.0);
        }
    }

    #[test]
    fn parses_and_deserializes() {
        assert_eq!("Classic".parse::<IdfWeighting>().unwrap(), IdfWeighting::Classic);
        assert!("bm25".parse::<IdfWeighting>().is_err());
        let cfg: IndexConfig = serde_json::from_str(r#"{"idf":"classic"}"#).unwrap();
        assert_eq!(cfg.idf, IdfWeighting::Classic);
        assert_eq!(cfg.min_similarity, DEFAULT_MIN_SIMILARITY);
        assert_eq!(cfg.default_top_k, DEFAULT_TOP_K);
    }
}
