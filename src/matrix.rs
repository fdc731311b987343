use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use crate::wavefront::{CoreSegment, Diagonal, DiagonalLayout, Neighbors};

pub type Score = i32;

/// 共享 DP 矩阵。
///
/// 逻辑尺寸为 (m+1)×(n+1)，第 0 行 / 第 0 列是隐式零边界，不占存储。
/// m·n 个内部单元格按对角线优先连续存放，同一条对角线在内存中相邻。
///
/// 单元格为 `AtomicI32`，全部使用 `Relaxed` 访问：写入互不重叠由分段保证，
/// 跨对角线的可见性由屏障保证。
#[derive(Debug)]
pub struct DpMatrix {
    layout: DiagonalLayout,
    cells: Box<[AtomicI32]>,
    /// 每个单元格的写入次数（仅 audit 模式）
    writes: Option<Box<[AtomicU32]>>,
}

impl DpMatrix {
    pub fn new(m: usize, n: usize) -> Self {
        let layout = DiagonalLayout::new(m, n);
        let cells = (0..layout.cells()).map(|_| AtomicI32::new(0)).collect();
        Self {
            layout,
            cells,
            writes: None,
        }
    }

    pub fn with_audit(m: usize, n: usize) -> Self {
        let mut mat = Self::new(m, n);
        mat.writes = Some((0..mat.layout.cells()).map(|_| AtomicU32::new(0)).collect());
        mat
    }

    #[inline]
    pub fn m(&self) -> usize {
        self.layout.m()
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.layout.n()
    }

    pub fn layout(&self) -> &DiagonalLayout {
        &self.layout
    }

    /// 清零（含写入计数）。
    pub fn clear(&self) {
        for c in self.cells.iter() {
            c.store(0, Ordering::Relaxed);
        }
        if let Some(w) = &self.writes {
            for c in w.iter() {
                c.store(0, Ordering::Relaxed);
            }
        }
    }

    /// 读取 (i, j)，0 <= i <= m，0 <= j <= n；边界返回 0。
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Score {
        assert!(i <= self.m() && j <= self.n(), "cell ({}, {}) outside {}x{} matrix", i, j, self.m(), self.n());
        if i == 0 || j == 0 {
            return 0;
        }
        self.cells[self.layout.index(i, j)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn neighbors(&self, i: usize, j: usize) -> Neighbors {
        Neighbors {
            diag: self.get(i - 1, j - 1),
            up: self.get(i - 1, j),
            left: self.get(i, j - 1),
        }
    }

    /// 取得对角线 `diag` 上区间 `seg` 的写入视图。
    pub fn segment(&self, diag: Diagonal, seg: CoreSegment) -> SegmentView<'_> {
        assert!(
            seg.start < seg.end && seg.end <= diag.len,
            "segment [{}, {}) outside diagonal {} of length {}",
            seg.start,
            seg.end,
            diag.index,
            diag.len
        );
        SegmentView {
            matrix: self,
            base: self.layout.diagonal_start(diag.index),
            diag,
            seg,
        }
    }

    /// 按行优先展开为 (m+1)×(n+1) 的快照（含零边界）。
    pub fn to_row_major(&self) -> Vec<Score> {
        let (m, n) = (self.m(), self.n());
        let mut out = vec![0; (m + 1) * (n + 1)];
        for i in 1..=m {
            for j in 1..=n {
                out[i * (n + 1) + j] = self.get(i, j);
            }
        }
        out
    }

    /// audit 模式下所有内部单元格的写入次数（行优先）；非 audit 模式返回 None。
    pub fn write_counts(&self) -> Option<Vec<u32>> {
        let w = self.writes.as_ref()?;
        let (m, n) = (self.m(), self.n());
        let mut out = Vec::with_capacity(m * n);
        for i in 1..=m {
            for j in 1..=n {
                out.push(w[self.layout.index(i, j)].load(Ordering::Relaxed));
            }
        }
        Some(out)
    }
}

/// 某个核心在某条对角线上的独占写入视图。
///
/// 视图只能写入自己区间内的元素；区间互不相交由分段器保证，
/// audit 模式会记录重复写入。
#[derive(Debug)]
pub struct SegmentView<'a> {
    matrix: &'a DpMatrix,
    base: usize,
    diag: Diagonal,
    seg: CoreSegment,
}

impl<'a> SegmentView<'a> {
    pub fn segment(&self) -> CoreSegment {
        self.seg
    }

    /// 区间内的 (k, i, j)。
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.seg.range().map(move |k| {
            let (i, j) = self.diag.coords(k);
            (k, i, j)
        })
    }

    #[inline]
    pub fn write(&self, k: usize, value: Score) {
        assert!(
            self.seg.range().contains(&k),
            "k={} outside segment [{}, {})",
            k,
            self.seg.start,
            self.seg.end
        );
        let idx = self.base + k;
        self.matrix.cells[idx].store(value, Ordering::Relaxed);
        if let Some(w) = &self.matrix.writes {
            w[idx].fetch_add(1, Ordering::Relaxed);
        }
    }
}
