use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// A candidate record. Immutable once part of a [`Corpus`].
///
/// `extra` carries any additional columns of the source row untouched so they can
/// be shown next to the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
    pub resume: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, resume: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seniority: None,
            resume: resume.into(),
            extra: Map::new(),
        }
    }

    pub fn with_seniority(mut self, seniority: impl Into<String>) -> Self {
        self.seniority = Some(seniority.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Content-derived identity of a corpus: SHA-256 over every résumé text in order.
///
/// Each text is length-prefixed, so moving words between résumés changes the
/// fingerprint. Names, ids and extra fields do not take part.
///
/// Deserialization only accepts 64 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl TryFrom<String> for Fingerprint {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Fingerprint(raw))
        } else {
            Err(format!("malformed corpus fingerprint '{raw}'"))
        }
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl Fingerprint {
    pub fn of_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        for text in texts {
            let bytes = text.as_ref().as_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for logs
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered candidates indexed together. Order is the tie-break order of rankings.
#[derive(Debug, Clone)]
pub struct Corpus {
    candidates: Vec<Candidate>,
    fingerprint: Fingerprint,
}

impl Corpus {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let fingerprint = Fingerprint::of_texts(candidates.iter().map(|c| c.resume.as_str()));
        Self { candidates, fingerprint }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Résumé texts in corpus order
    pub fn resumes(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.resume.as_str()).collect()
    }
}

impl FromIterator<Candidate> for Corpus {
    fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
        Corpus::new(iter.into_iter().collect())
    }
}
