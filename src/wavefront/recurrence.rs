use crate::config::{EdgePolicy, ScoringParams};
use crate::matrix::Score;

/// 单元格 (i, j) 的三个已定稿邻居。边界行 / 列上的邻居为 0。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// M[i-1][j-1]
    pub diag: Score,
    /// M[i-1][j]
    pub up: Score,
    /// M[i][j-1]
    pub left: Score,
}

/// 标准 Smith-Waterman 递推（线性 gap，负值归零）。
#[inline]
pub fn cell_score(a: u8, b: u8, nb: Neighbors, p: &ScoringParams) -> Score {
    let candidate_match = nb.diag + p.substitution(a, b);
    let candidate_delete = nb.up + p.gap_score;
    let candidate_insert = nb.left + p.gap_score;
    candidate_match.max(candidate_delete).max(candidate_insert).max(0)
}

/// 按边界策略计算 (i, j)。只有首行 (i == 1) / 首列 (j == 1) 会走不同公式。
#[inline]
pub fn score_cell(
    policy: EdgePolicy,
    i: usize,
    j: usize,
    a: u8,
    b: u8,
    nb: Neighbors,
    p: &ScoringParams,
) -> Score {
    let first_row = i == 1;
    let first_col = j == 1;
    if !(first_row || first_col) {
        return cell_score(a, b, nb, p);
    }

    let subst = p.substitution(a, b);
    let best = match policy {
        EdgePolicy::Standard => return cell_score(a, b, nb, p),
        EdgePolicy::GapConstant => {
            let delete = if first_row { p.gap_score } else { nb.up + p.gap_score };
            let insert = if first_col { p.gap_score } else { nb.left + p.gap_score };
            subst.max(delete).max(insert)
        }
        EdgePolicy::ZeroCandidate => {
            let delete = if first_row { 0 } else { nb.up + p.gap_score };
            let insert = if first_col { 0 } else { nb.left + p.gap_score };
            (nb.diag + subst).max(delete).max(insert)
        }
    };
    best.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> ScoringParams {
        ScoringParams {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -2,
        }
    }

    #[test]
    fn match_extends_diagonal() {
        let nb = Neighbors { diag: 4, up: 0, left: 0 };
        assert_eq!(cell_score(b'A', b'A', nb, &p()), 6);
    }

    #[test]
    fn gap_candidates_compete() {
        let nb = Neighbors { diag: 0, up: 7, left: 3 };
        assert_eq!(cell_score(b'A', b'C', nb, &p()), 5);
        let nb = Neighbors { diag: 0, up: 3, left: 9 };
        assert_eq!(cell_score(b'A', b'C', nb, &p()), 7);
    }

    #[test]
    fn negative_scores_reset_to_zero() {
        let nb = Neighbors { diag: 0, up: 1, left: 1 };
        assert_eq!(cell_score(b'A', b'C', nb, &p()), 0);
    }

    #[test]
    fn interior_cells_ignore_edge_policy() {
        let nb = Neighbors { diag: 3, up: 5, left: 1 };
        let s = ScoringParams { match_score: 2, mismatch_score: 1, gap_score: 1 };
        let want = cell_score(b'A', b'G', nb, &s);
        for policy in [EdgePolicy::Standard, EdgePolicy::GapConstant, EdgePolicy::ZeroCandidate] {
            assert_eq!(score_cell(policy, 2, 2, b'A', b'G', nb, &s), want);
        }
    }

    #[test]
    fn gap_constant_matches_standard_on_edges() {
        let s = ScoringParams { match_score: 2, mismatch_score: 1, gap_score: 1 };
        // 首行 up/diag 为边界 0；首列 left/diag 为边界 0
        let row = Neighbors { diag: 0, up: 0, left: 6 };
        let col = Neighbors { diag: 0, up: 6, left: 0 };
        let corner = Neighbors::default();
        for (i, j, nb) in [(1, 4, row), (4, 1, col), (1, 1, corner)] {
            assert_eq!(
                score_cell(EdgePolicy::GapConstant, i, j, b'A', b'C', nb, &s),
                score_cell(EdgePolicy::Standard, i, j, b'A', b'C', nb, &s),
            );
        }
    }

    #[test]
    fn zero_candidate_diverges_only_with_positive_gap() {
        let corner = Neighbors::default();
        // 负 gap：0 候选与 gap 候选都被归零，结果一致
        assert_eq!(
            score_cell(EdgePolicy::ZeroCandidate, 1, 1, b'A', b'C', corner, &p()),
            score_cell(EdgePolicy::Standard, 1, 1, b'A', b'C', corner, &p()),
        );

        // 正 gap：标准递推 max(-3, 0+1, 0+1) = 1，0 候选写法 max(-3, 0, 0) = 0
        let s = ScoringParams { match_score: 2, mismatch_score: -3, gap_score: 1 };
        assert_eq!(score_cell(EdgePolicy::Standard, 1, 1, b'A', b'C', corner, &s), 1);
        assert_eq!(score_cell(EdgePolicy::ZeroCandidate, 1, 1, b'A', b'C', corner, &s), 0);
    }
}
