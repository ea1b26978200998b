use crate::config::EngineConfig;

/// Collection statistics and parameters for BM25.
///
/// The idf factor is `ln((N - ft + 0.5) / (ft + 0.5))` without the usual
/// `+ 1`, so a term present in more than half of the corpus contributes a
/// negative amount.
#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    pub num_docs: u32,
    pub avg_len: f64,
    pub k1: f64,
    pub b: f64,
}

impl Bm25 {
    pub fn new(num_docs: u32, total_terms: u64, config: &EngineConfig) -> Self {
        let avg_len = if num_docs == 0 { 0.0 } else { total_terms as f64 / num_docs as f64 };
        Self { num_docs, avg_len, k1: config.k1, b: config.b }
    }

    /// `ft[i]` is the document count of query term i, `fdt[i]` its frequency
    /// in the candidate, `doc_len` the candidate's term count.
    pub fn score(&self, ft: &[u32], fdt: &[u32], doc_len: u32) -> f64 {
        let n = self.num_docs as f64;
        let norm = if self.avg_len > 0.0 { doc_len as f64 / self.avg_len } else { 0.0 };
        let k = self.k1 * ((1.0 - self.b) + self.b * norm);
        ft.iter()
            .zip(fdt)
            .filter(|&(_, &f)| f > 0)
            .map(|(&ft, &fdt)| {
                let ft = ft as f64;
                let fdt = fdt as f64;
                let idf = ((n - ft + 0.5) / (ft + 0.5)).ln();
                idf * ((self.k1 + 1.0) * fdt) / (k + fdt)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm25(n: u32, total: u64) -> Bm25 {
        Bm25::new(n, total, &EngineConfig::default())
    }

    #[test]
    fn absent_term_scores_zero() {
        let s = bm25(2, 30);
        assert_eq!(s.score(&[1], &[0], 20), 0.0);
    }

    #[test]
    fn half_corpus_term_has_zero_idf() {
        // N=2, ft=1: ln(1.5 / 1.5) == 0, so even the matching doc scores 0.
        let s = bm25(2, 30);
        let a = s.score(&[1], &[1], 10);
        let b = s.score(&[1], &[0], 20);
        assert!(a.abs() < 1e-12);
        assert!(a >= b);
    }

    #[test]
    fn matching_doc_beats_non_matching() {
        let s = bm25(3, 45);
        let a = s.score(&[1], &[1], 10);
        let b = s.score(&[1], &[0], 20);
        assert!(a > b);
        assert_eq!(b, 0.0);
        let expected = (2.5f64 / 1.5).ln() * 2.2 / (1.2 * (0.25 + 0.75 * 10.0 / 15.0) + 1.0);
        assert!((a - expected).abs() < 1e-12);
    }

    #[test]
    fn common_terms_go_negative() {
        let s = bm25(4, 40);
        assert!(s.score(&[3], &[2], 10) < 0.0);
    }

    #[test]
    fn shorter_documents_rank_higher() {
        let s = bm25(10, 1000);
        assert!(s.score(&[2], &[3], 50) > s.score(&[2], &[3], 200));
    }
}
