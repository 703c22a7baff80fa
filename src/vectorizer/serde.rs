use ::serde::{Deserialize, Serialize};

use crate::config::IndexerConfig;
use crate::error::{MatchError, Result};
use crate::recommend::corpus::Fingerprint;
use crate::vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};
use crate::vectorizer::FittedSpace;

/// Persistable form of a fitted space, tagged with the indexer configuration it
/// was fitted under and the fingerprint of its corpus.
///
/// Encoded as CBOR. Loading a snapshot never refits; the caller decides whether
/// configuration and fingerprint still match. Decoding rejects spaces that are
/// inconsistent with their own configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SpaceSnapshot<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    pub config: IndexerConfig,
    pub fingerprint: Fingerprint,
    pub space: FittedSpace<E>,
}

impl<E> SpaceSnapshot<E>
where
    E: TFIDFEngine,
{
    pub fn new(config: IndexerConfig, fingerprint: Fingerprint, space: FittedSpace<E>) -> Self {
        Self { config, fingerprint, space }
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = serde_cbor::from_slice(bytes)?;
        snapshot
            .config
            .validate()
            .map_err(|e| MatchError::Snapshot(format!("snapshot configuration: {e}")))?;
        snapshot.space.validate(&snapshot.config)?;
        Ok(snapshot)
    }
}
