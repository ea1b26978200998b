//! Query-biased snippets: find the densest cluster of query-word matches and
//! back up to the start of its sentence.

use std::collections::VecDeque;

/// Byte offsets of every case-insensitive occurrence of every word, ascending.
pub fn match_offsets(content: &str, words: &[String]) -> Vec<usize> {
    // ASCII lowering keeps byte offsets aligned with `content`.
    let lower = content.to_ascii_lowercase();
    let mut offsets: Vec<usize> = Vec::new();
    for word in words {
        if word.is_empty() {
            continue;
        }
        offsets.extend(lower.match_indices(word.as_str()).map(|(i, _)| i));
    }
    offsets.sort_unstable();
    offsets
}

/// Start of the window holding the most matches within `span` bytes of each
/// other. Ties keep the earliest window.
pub fn densest_window(offsets: &[usize], span: usize) -> Option<usize> {
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut best: Option<(usize, usize)> = None;
    for &idx in offsets {
        window.push_back(idx);
        while let Some(&front) = window.front() {
            // A lone match always fits, so this never empties the window.
            if idx - front > span {
                window.pop_front();
            } else {
                break;
            }
        }
        let count = window.len();
        if best.map_or(true, |(_, c)| count > c) {
            best = window.front().map(|&start| (start, count));
        }
    }
    best.map(|(start, _)| start)
}

/// Offset of the last capital letter in `content[..end]` that is followed by a
/// lower-case letter or a space, or 0.
fn last_capital_boundary(content: &str, end: usize) -> usize {
    for (i, c) in content[..end].char_indices().rev() {
        if !c.is_uppercase() {
            continue;
        }
        let next = content[i + c.len_utf8()..].chars().next();
        if next.is_some_and(|n| n.is_lowercase() || n == ' ') {
            return i;
        }
    }
    0
}

/// Pull the snippet start back to a sentence boundary before `window_start`.
pub fn sentence_start(content: &str, window_start: usize) -> usize {
    match content[..window_start].rfind('.') {
        Some(dot) if dot > 0 => dot + 1,
        _ => last_capital_boundary(content, window_start),
    }
}

pub fn make_snippet(content: &str, words: &[String], span: usize, max_chars: usize) -> String {
    let offsets = match_offsets(content, words);
    let start = densest_window(&offsets, span)
        .map(|w| sentence_start(content, w))
        .unwrap_or(0);
    let text = content[start..].trim_start();
    truncate(text, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
