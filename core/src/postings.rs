use crate::codec;
use crate::error::CodecError;
use crate::index::DocId;

/// One term's decoded postings, walked forward through `next_geq`.
///
/// Each query decodes its own lists, so the cursor is never shared.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    doc_ids: Vec<DocId>,
    freqs: Vec<u32>,
    cursor: usize,
}

impl PostingList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from (docId, frequency) pairs in ascending docId order.
    /// A repeated docId keeps the first frequency seen.
    pub fn from_pairs<I: IntoIterator<Item = (DocId, u32)>>(pairs: I) -> Self {
        let mut list = Self::default();
        for (doc_id, freq) in pairs {
            list.push(doc_id, freq);
        }
        list
    }

    fn push(&mut self, doc_id: DocId, freq: u32) {
        if self.doc_ids.last().is_some_and(|&last| last >= doc_id) {
            return;
        }
        self.doc_ids.push(doc_id);
        self.freqs.push(freq);
    }

    /// Decode a block of `n` docId deltas followed by `n` frequencies.
    pub fn decode(block: &[u8]) -> Result<Self, CodecError> {
        let values = codec::decode_all(block)?;
        if values.len() % 2 != 0 {
            return Err(CodecError::UnevenBlock { count: values.len() });
        }
        let (deltas, freqs) = values.split_at(values.len() / 2);
        let mut list = Self::default();
        let mut doc_id: DocId = 0;
        for (&delta, &freq) in deltas.iter().zip(freqs) {
            doc_id = doc_id.checked_add(delta).ok_or(CodecError::Overflow { position: 0 })?;
            list.push(doc_id, freq);
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }

    pub fn frequencies(&self) -> &[u32] {
        &self.freqs
    }

    /// Smallest docId >= `threshold` at or after the cursor. The cursor stops
    /// on the returned entry and never moves backward.
    pub fn next_geq(&mut self, threshold: DocId) -> Option<DocId> {
        let rest = &self.doc_ids[self.cursor..];
        self.cursor += rest.partition_point(|&d| d < threshold);
        self.doc_ids.get(self.cursor).copied()
    }

    /// Frequency of the entry under the cursor.
    pub fn freq(&self) -> Option<u32> {
        self.freqs.get(self.cursor).copied()
    }
}
