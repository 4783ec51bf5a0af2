use num::Num;
use serde::de::Error as DeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{SparseVector, TermId};

impl<N> Serialize for SparseVector<N>
where
    N: Num + Copy + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // nnz is written for readers that want to preallocate
        let mut state = serializer.serialize_struct("SparseVector", 2)?;
        state.serialize_field("nnz", &(self.nnz() as u64))?;
        state.serialize_field("entries", self.as_slice())?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for SparseVector<N>
where
    N: Num + Copy + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SparseVectorData<N> {
            nnz: u64,
            entries: Vec<(TermId, N)>,
        }

        let data = SparseVectorData::<N>::deserialize(deserializer)?;
        if data.nnz != data.entries.len() as u64 {
            return Err(DeError::custom("nnz does not match entries length"));
        }
        if data.entries.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(DeError::custom("term ids must be strictly ascending"));
        }

        let mut vec = SparseVector::with_capacity(data.entries.len());
        for (id, value) in data.entries {
            vec.push(id, value);
        }
        Ok(vec)
    }
}
