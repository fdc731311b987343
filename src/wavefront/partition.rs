//! 将一条对角线的元素切分给各核心。

/// 对角线局部下标上的半开区间 [start, end)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSegment {
    pub start: usize,
    pub end: usize,
}

impl CoreSegment {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// 本条对角线上实际分到工作的核心数。
#[inline]
pub fn active_cores(len: usize, cores: usize) -> usize {
    len.min(cores)
}

/// 核心 `core` 在长度为 `len` 的对角线上的区间。
///
/// 没有分到元素的核心返回 `None`，但它仍然必须到达本条对角线的屏障。
/// 起止两端都截断到 `len`：最后一个活跃核心吸收余数，
/// 起点已越过 `len` 的活跃核心得到空区间。
pub fn segment_for(len: usize, cores: usize, core: usize) -> Option<CoreSegment> {
    let active = active_cores(len, cores);
    if core >= active {
        return None;
    }
    let per_core = len.div_ceil(active);
    let start = (core * per_core).min(len);
    let end = ((core + 1) * per_core).min(len);
    if start == end {
        return None;
    }
    Some(CoreSegment { start, end })
}

/// 全部非空区间，按核心编号排列。
pub fn partition(len: usize, cores: usize) -> Vec<(usize, CoreSegment)> {
    let segs: Vec<(usize, CoreSegment)> = (0..cores)
        .filter_map(|c| segment_for(len, cores, c).map(|s| (c, s)))
        .collect();

    debug_assert!(
        segs.windows(2).all(|w| w[0].1.end == w[1].1.start),
        "segments of len {} over {} cores are not contiguous",
        len,
        cores
    );
    debug_assert_eq!(segs.iter().map(|(_, s)| s.len()).sum::<usize>(), len);
    segs
}
