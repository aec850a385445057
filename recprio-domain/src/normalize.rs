use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Text shorter than this (in characters) is table debris.
    pub min_text_len: usize,
    pub max_digit_ratio: f64,
    /// Records more similar than this to an already kept record are dropped.
    pub dedup_threshold: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            min_text_len: 40,
            max_digit_ratio: 0.45,
            dedup_threshold: 0.85,
        }
    }
}

/// Replace NBSP and U+FFFD with spaces, collapse whitespace runs, trim.
pub fn clean_text(text: &str) -> String {
    text.replace(['\u{00a0}', '\u{fffd}'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_numeric_noise(text: &str, config: &NormalizeConfig) -> bool {
    let len = text.chars().count();
    if len < config.min_text_len {
        return true;
    }
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    digits as f64 / len.max(1) as f64 > config.max_digit_ratio
}

/// Lowercase, keeping only ASCII letters and whitespace.
pub fn similarity_key(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect()
}

/// `rec-` plus the first 12 hex digits of SHA-256 over `sector|year|text`.
pub fn derive_id(sector: &str, year: Option<i32>, text: &str) -> String {
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    let digest = Sha256::digest(format!("{sector}|{year}|{text}").as_bytes());
    let hex = hex::encode(digest);
    format!("rec-{}", &hex[..12])
}

/// Keep-newest ordering: by year descending, missing years last, stable otherwise.
pub fn newest_first<T>(items: &mut [T], year: impl Fn(&T) -> Option<i32>) {
    items.sort_by(|a, b| match (year(a), year(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Near-duplicate filter over similarity keys.
///
/// Keys are offered in priority order; [`Deduper::admit`] returns `false` when the key is more
/// similar than the threshold to one already admitted. Similarity is normalized Levenshtein.
#[derive(Debug)]
pub struct Deduper {
    threshold: f64,
    exact: HashSet<String>,
    kept: Vec<(usize, String)>,
}

impl Deduper {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            exact: HashSet::new(),
            kept: Vec::new(),
        }
    }

    pub fn admit(&mut self, key: &str) -> bool {
        if self.exact.contains(key) {
            return false;
        }
        let len = key.chars().count();
        let duplicate = self.kept.iter().any(|(kept_len, kept)| {
            // Edit distance is at least the length difference, which bounds the similarity.
            let longest = len.max(*kept_len);
            if longest > 0 {
                let bound = 1.0 - len.abs_diff(*kept_len) as f64 / longest as f64;
                if bound <= self.threshold {
                    return false;
                }
            }
            strsim::normalized_levenshtein(key, kept) > self.threshold
        });
        if duplicate {
            return false;
        }
        self.exact.insert(key.to_string());
        self.kept.push((len, key.to_string()));
        true
    }
}
