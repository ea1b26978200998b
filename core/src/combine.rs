//! Candidate generation over a query's posting lists.
//!
//! Both modes hand each candidate to a callback together with its
//! per-list frequency vector, so scoring and top-K stay out of here.

use crate::index::DocId;
use crate::postings::PostingList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Every docId found in any list is a candidate.
    Union,
    /// Only docIds present in every list are candidates.
    Intersection,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            // "conjunctive"/"disjunctive" are the labels older clients send,
            // kept with the behavior they have always selected.
            "union" | "u" | "conjunctive" => Ok(QueryMode::Union),
            "intersection" | "i" | "disjunctive" => Ok(QueryMode::Intersection),
            other => Err(format!("unknown query mode: {other}")),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Union => f.write_str("union"),
            QueryMode::Intersection => f.write_str("intersection"),
        }
    }
}

pub fn combine<F>(mode: QueryMode, lists: &mut [PostingList], on_candidate: F)
where
    F: FnMut(DocId, &[u32]),
{
    match mode {
        QueryMode::Union => union(lists, on_candidate),
        QueryMode::Intersection => intersection(lists, on_candidate),
    }
}

/// Walk every list to the end and report each docId once, in ascending
/// order, with zeros for the lists that lack it.
pub fn union<F>(lists: &mut [PostingList], mut on_candidate: F)
where
    F: FnMut(DocId, &[u32]),
{
    let width = lists.len();
    let mut seen: BTreeMap<DocId, Vec<u32>> = BTreeMap::new();
    for (i, list) in lists.iter_mut().enumerate() {
        let mut d: DocId = 0;
        while let Some(found) = list.next_geq(d) {
            let freqs = seen.entry(found).or_insert_with(|| vec![0; width]);
            freqs[i] = list.freq().unwrap_or(0);
            match found.checked_add(1) {
                Some(next) => d = next,
                None => break,
            }
        }
    }
    for (doc_id, freqs) in &seen {
        on_candidate(*doc_id, freqs);
    }
}

/// Synchronized probing: raise the candidate to the largest `next_geq`
/// answer until every list agrees, then score and move one past it.
pub fn intersection<F>(lists: &mut [PostingList], mut on_candidate: F)
where
    F: FnMut(DocId, &[u32]),
{
    let Some(first) = lists.first_mut() else {
        return;
    };
    let Some(mut did) = first.next_geq(0) else {
        return;
    };
    let mut freqs = vec![0u32; lists.len()];
    loop {
        let mut highest = did;
        for list in lists.iter_mut() {
            match list.next_geq(did) {
                Some(d) => highest = highest.max(d),
                None => return,
            }
        }
        if highest > did {
            did = highest;
            continue;
        }
        for (slot, list) in freqs.iter_mut().zip(lists.iter()) {
            *slot = list.freq().unwrap_or(0);
        }
        on_candidate(did, &freqs);
        match did.checked_add(1) {
            Some(next) => did = next,
            None => return,
        }
    }
}
