use crate::error::Result;
use crate::vectorizer::config::TfidfConfig;
use crate::vectorizer::corpus::CorpusStatistics;
use crate::vectorizer::TfidfModel;

/// Persistence of fitted statistics.
///
/// Only the statistics are stored: document frequencies, document count and
/// pivot statistics. The configuration (and any custom weighting function in
/// it) is supplied again when loading.
impl CorpusStatistics {
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

impl TfidfModel {
    /// Rebuild a fitted model from a CBOR snapshot of its statistics.
    pub fn load_cbor(config: TfidfConfig, bytes: &[u8]) -> Result<Self> {
        TfidfModel::from_statistics(config, CorpusStatistics::from_cbor(bytes)?)
    }
}
