use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::matrix::{DpMatrix, Score};

/// 最高分单元格。并列时取行优先顺序中的第一个；全零矩阵返回 (0, 0)。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestCell {
    pub score: Score,
    pub i: usize,
    pub j: usize,
}

impl BestCell {
    fn pick(self, other: BestCell) -> BestCell {
        if other.score > self.score || (other.score == self.score && (other.i, other.j) < (self.i, self.j)) {
            other
        } else {
            self
        }
    }
}

fn best_in_row(mat: &DpMatrix, i: usize) -> BestCell {
    let mut best = BestCell::default();
    for j in 1..=mat.n() {
        let v = mat.get(i, j);
        if v > best.score {
            best = BestCell { score: v, i, j };
        }
    }
    best
}

/// 顺序扫描整个矩阵。
pub fn best_cell(mat: &DpMatrix) -> BestCell {
    let mut best = BestCell::default();
    for i in 1..=mat.m() {
        let row = best_in_row(mat, i);
        if row.score > best.score {
            best = row;
        }
    }
    best
}

/// 按行并行归约，结果与 [`best_cell`] 相同。
pub fn best_cell_parallel(mat: &DpMatrix) -> BestCell {
    (1..=mat.m())
        .into_par_iter()
        .map(|i| best_in_row(mat, i))
        .reduce(BestCell::default, BestCell::pick)
}

/// 左上角摘录，包含第 0 行 / 第 0 列零边界。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub rows: usize,
    pub cols: usize,
    /// (rows+1)×(cols+1)，行优先
    pub values: Vec<Score>,
}

pub fn excerpt(mat: &DpMatrix, rows: usize, cols: usize) -> Excerpt {
    let rows = rows.min(mat.m());
    let cols = cols.min(mat.n());
    let mut values = Vec::with_capacity((rows + 1) * (cols + 1));
    for i in 0..=rows {
        for j in 0..=cols {
            values.push(mat.get(i, j));
        }
    }
    Excerpt { rows, cols, values }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DP Matrix (first {}x{}):", self.rows, self.cols)?;
        for row in self.values.chunks(self.cols + 1) {
            for v in row {
                write!(f, "{:3} ", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavefront::{CoreSegment, Diagonals};

    /// 按 f(i, j) 填满矩阵
    fn filled(m: usize, n: usize, f: impl Fn(usize, usize) -> Score) -> DpMatrix {
        let mat = DpMatrix::new(m, n);
        for diag in Diagonals::new(m, n) {
            let view = mat.segment(diag, CoreSegment { start: 0, end: diag.len });
            for (k, i, j) in view.cells() {
                view.write(k, f(i, j));
            }
        }
        mat
    }

    #[test]
    fn finds_maximum_and_first_position() {
        let mat = filled(4, 6, |i, j| if (i, j) == (2, 5) || (i, j) == (3, 1) { 9 } else { (i + j) as Score % 4 });
        let best = best_cell(&mat);
        assert_eq!(best, BestCell { score: 9, i: 2, j: 5 });
        assert_eq!(best_cell_parallel(&mat), best);
    }

    #[test]
    fn zero_matrix_reports_origin() {
        let mat = DpMatrix::new(5, 5);
        assert_eq!(best_cell(&mat), BestCell::default());
        assert_eq!(best_cell_parallel(&mat), BestCell::default());
        assert_eq!(best_cell(&DpMatrix::new(0, 3)), BestCell::default());
    }

    #[test]
    fn parallel_reduce_keeps_row_major_tie_break() {
        let mat = filled(40, 30, |i, j| ((i * 7 + j * 3) % 11) as Score);
        assert_eq!(best_cell_parallel(&mat), best_cell(&mat));
    }

    #[test]
    fn excerpt_includes_border_and_clamps() {
        let mat = filled(2, 3, |i, j| (i * 10 + j) as Score);
        let ex = excerpt(&mat, 10, 2);
        assert_eq!((ex.rows, ex.cols), (2, 2));
        assert_eq!(ex.values, vec![0, 0, 0, 0, 11, 12, 0, 21, 22]);
        let text = ex.to_string();
        assert!(text.starts_with("DP Matrix (first 2x2):\n"));
        assert!(text.contains(" 11  12 "));
    }
}
