use crate::config::{EdgePolicy, ScoringParams};
use crate::matrix::Score;
use crate::store::SequenceStore;
use crate::wavefront::{score_cell, Neighbors};

/// 行优先逐格填充 (m+1)×(n+1) 矩阵（含零边界），作为波前结果的参照。
pub fn fill_row_major(store: &SequenceStore, p: &ScoringParams, policy: EdgePolicy) -> Vec<Score> {
    let m = store.m();
    let n = store.n();
    let cols = n + 1;
    let mut h = vec![0; (m + 1) * cols];

    for i in 1..=m {
        for j in 1..=n {
            let idx = i * cols + j;
            let up_idx = (i - 1) * cols + j;
            let left_idx = i * cols + (j - 1);
            let diag_idx = (i - 1) * cols + (j - 1);

            let nb = Neighbors {
                diag: h[diag_idx],
                up: h[up_idx],
                left: h[left_idx],
            };
            let (a, b) = store.pair(i, j);
            h[idx] = score_cell(policy, i, j, a, b, nb, p);
        }
    }
    h
}

pub fn best_score_row_major(store: &SequenceStore, p: &ScoringParams, policy: EdgePolicy) -> Score {
    fill_row_major(store, p, policy).into_iter().max().unwrap_or(0)
}
