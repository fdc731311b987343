//! 反对角线调度。
//!
//! 内部单元格使用 1 起始坐标 (1 <= i <= m, 1 <= j <= n)，
//! 第 d 条对角线（d = 1..=m+n）包含所有满足 `i + j = d + 1` 的单元格。
//! 对角线内的局部下标 k 从 0 开始，k 增大时 i 增大、j 减小。

/// 第 d 条对角线上的单元格数。d = 0 与 d >= m + n 时为 0。
#[inline]
pub fn diagonal_length(d: usize, m: usize, n: usize) -> usize {
    if d == 0 {
        return 0;
    }
    let lo = m.min(n);
    let hi = m.max(n);
    if d <= lo {
        d
    } else if d <= hi {
        lo
    } else {
        (m + n).saturating_sub(d)
    }
}

/// 对角线 d 的首行号。
#[inline]
fn first_row(d: usize, n: usize) -> usize {
    if d <= n {
        1
    } else {
        d - n + 1
    }
}

/// 第 d 条对角线上第 k 个元素的矩阵坐标 (i, j)。调用方保证 k < L(d)。
#[inline]
pub fn diagonal_coords(d: usize, k: usize, _m: usize, n: usize) -> (usize, usize) {
    let i = first_row(d, n) + k;
    (i, d + 1 - i)
}

/// 派生的对角线描述：编号、长度、首行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagonal {
    pub index: usize,
    pub len: usize,
    i_start: usize,
}

impl Diagonal {
    pub fn new(d: usize, m: usize, n: usize) -> Self {
        Self {
            index: d,
            len: diagonal_length(d, m, n),
            i_start: first_row(d, n),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn coords(&self, k: usize) -> (usize, usize) {
        debug_assert!(k < self.len, "k={} outside diagonal {} of length {}", k, self.index, self.len);
        let i = self.i_start + k;
        (i, self.index + 1 - i)
    }
}

/// 按递增顺序遍历所有非空对角线。
#[derive(Debug, Clone)]
pub struct Diagonals {
    m: usize,
    n: usize,
    next: usize,
}

impl Diagonals {
    pub fn new(m: usize, n: usize) -> Self {
        Self { m, n, next: 1 }
    }
}

impl Iterator for Diagonals {
    type Item = Diagonal;

    fn next(&mut self) -> Option<Diagonal> {
        while self.next <= self.m + self.n {
            let diag = Diagonal::new(self.next, self.m, self.n);
            self.next += 1;
            if !diag.is_empty() {
                return Some(diag);
            }
        }
        None
    }
}

/// 对角线优先的存储布局：每条对角线在存储中连续。
/// `starts[d]` 为第 d 条对角线在存储中的起始偏移，`starts[m + n]` 等于 m·n。
#[derive(Debug, Clone)]
pub struct DiagonalLayout {
    m: usize,
    n: usize,
    starts: Vec<usize>,
}

impl DiagonalLayout {
    pub fn new(m: usize, n: usize) -> Self {
        let mut starts = Vec::with_capacity(m + n + 1);
        let mut acc = 0usize;
        starts.push(0); // d = 0 (空)
        for d in 1..=m + n {
            starts.push(acc);
            acc += diagonal_length(d, m, n);
        }
        debug_assert_eq!(acc, m * n);
        Self { m, n, starts }
    }

    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.m * self.n
    }

    #[inline]
    pub fn diagonal(&self, d: usize) -> Diagonal {
        Diagonal::new(d, self.m, self.n)
    }

    #[inline]
    pub fn diagonal_start(&self, d: usize) -> usize {
        self.starts[d]
    }

    /// 内部单元格 (i, j) 的存储下标。
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!((1..=self.m).contains(&i) && (1..=self.n).contains(&j));
        let d = i + j - 1;
        self.starts[d] + (i - first_row(d, self.n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_matrix_lower_diagonals_stay_in_bounds() {
        // 40×20：d >= 20 的对角线从第 d - 19 行开始，列号始终落在 1..=20
        let (m, n) = (40, 20);
        let mut cells = 0;
        for diag in Diagonals::new(m, n).filter(|d| d.index >= n) {
            for k in 0..diag.len {
                let (i, j) = diag.coords(k);
                assert!((1..=m).contains(&i) && (1..=n).contains(&j), "d={} k={}", diag.index, k);
                cells += 1;
            }
        }
        let upper: usize = (1..n).map(|d| diagonal_length(d, m, n)).sum();
        assert_eq!(cells + upper, m * n);
    }

    #[test]
    fn lengths_for_3x5() {
        let lens: Vec<usize> = (1..=8).map(|d| diagonal_length(d, 3, 5)).collect();
        assert_eq!(lens, vec![1, 2, 3, 3, 3, 2, 1, 0]);
        assert_eq!(lens.iter().sum::<usize>(), 15);
    }

    #[test]
    fn lengths_sum_to_cell_count() {
        for m in 0..=12 {
            for n in 0..=12 {
                let total: usize = (1..=m + n).map(|d| diagonal_length(d, m, n)).sum();
                assert_eq!(total, m * n, "m={} n={}", m, n);
                if m + n > 0 {
                    assert_eq!(diagonal_length(m + n, m, n), 0);
                }
            }
        }
        assert_eq!(diagonal_length(0, 4, 4), 0);
        assert_eq!(diagonal_length(20, 4, 4), 0);
    }

    #[test]
    fn coords_stay_on_diagonal_and_are_monotonic() {
        for (m, n) in [(3, 5), (5, 3), (4, 4), (1, 7), (7, 1)] {
            for d in 1..m + n {
                let len = diagonal_length(d, m, n);
                let mut prev: Option<(usize, usize)> = None;
                for k in 0..len {
                    let (i, j) = diagonal_coords(d, k, m, n);
                    assert_eq!(i + j, d + 1);
                    assert!((1..=m).contains(&i) && (1..=n).contains(&j), "d={} k={} -> ({},{})", d, k, i, j);
                    if let Some((pi, pj)) = prev {
                        assert_eq!(i, pi + 1);
                        assert_eq!(j + 1, pj);
                    }
                    prev = Some((i, j));
                }
            }
        }
    }

    #[test]
    fn coords_cover_every_cell_once() {
        let (m, n) = (6, 9);
        let mut seen = vec![0u32; (m + 1) * (n + 1)];
        for d in 1..=m + n {
            for k in 0..diagonal_length(d, m, n) {
                let (i, j) = diagonal_coords(d, k, m, n);
                seen[i * (n + 1) + j] += 1;
            }
        }
        for i in 1..=m {
            for j in 1..=n {
                assert_eq!(seen[i * (n + 1) + j], 1);
            }
        }
    }

    #[test]
    fn diagonals_iterator_skips_empty() {
        let ds: Vec<usize> = Diagonals::new(3, 5).map(|d| d.len).collect();
        assert_eq!(ds, vec![1, 2, 3, 3, 3, 2, 1]);
        assert_eq!(Diagonals::new(0, 5).count(), 0);
        assert_eq!(Diagonals::new(1, 1).count(), 1);
    }

    #[test]
    fn layout_index_is_a_bijection() {
        let (m, n) = (5, 8);
        let layout = DiagonalLayout::new(m, n);
        let mut hit = vec![false; layout.cells()];
        for d in 1..=m + n {
            let diag = layout.diagonal(d);
            for k in 0..diag.len {
                let (i, j) = diag.coords(k);
                let idx = layout.index(i, j);
                assert_eq!(idx, layout.diagonal_start(d) + k);
                assert!(!hit[idx]);
                hit[idx] = true;
            }
        }
        assert!(hit.into_iter().all(|h| h));
    }
}
