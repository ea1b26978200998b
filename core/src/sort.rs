//! In-memory stand-in for the external term sort. Every record is held at
//! once, so this only suits corpora that fit in memory.

use crate::index::PostingRecord;
use crate::persist::{create_text_writer, open_text_reader};
use crate::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Merge the segment streams into one stream ordered by term, then docId.
pub fn sort_segments(inputs: &[PathBuf], output: &Path) -> Result<usize> {
    let mut records: Vec<PostingRecord> = Vec::new();
    for input in inputs {
        let reader = open_text_reader(input)?;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match PostingRecord::parse(&line) {
                Some(rec) => records.push(rec),
                None => tracing::warn!(file = %input.display(), line = i + 1, "skipping malformed posting"),
            }
        }
    }
    records.sort_unstable();

    let mut out = create_text_writer(output)?;
    for rec in &records {
        out.write_all(rec.to_line().as_bytes())?;
    }
    out.finish()?;
    tracing::info!(records = records.len(), output = %output.display(), "sorted postings");
    Ok(records.len())
}
