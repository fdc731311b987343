use crate::error::{ConfigError, Result};

/// 只读符号序列。构造后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    symbols: Box<[u8]>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, symbols: &[u8]) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
}

/// 两条待比对序列：`a` 对应矩阵行（长度 m），`b` 对应矩阵列（长度 n）。
#[derive(Debug, Clone)]
pub struct SequenceStore {
    a: Sequence,
    b: Sequence,
}

impl SequenceStore {
    /// 超过 `max_len` 的序列在初始化时拒绝，矩阵永远不会越界写入。
    pub fn new(a: Sequence, b: Sequence, max_len: usize) -> Result<Self> {
        for (which, seq) in [('a', &a), ('b', &b)] {
            if seq.len() > max_len {
                return Err(ConfigError::SequenceTooLong {
                    which,
                    len: seq.len(),
                    max: max_len,
                });
            }
        }
        Ok(Self { a, b })
    }

    pub fn from_bytes(a: &[u8], b: &[u8], max_len: usize) -> Result<Self> {
        Self::new(Sequence::new("seq1", a), Sequence::new("seq2", b), max_len)
    }

    pub fn a(&self) -> &Sequence {
        &self.a
    }

    pub fn b(&self) -> &Sequence {
        &self.b
    }

    #[inline]
    pub fn m(&self) -> usize {
        self.a.len()
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.b.len()
    }

    /// 单元格 (i, j)（1 起始）对应的符号对。
    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> (u8, u8) {
        (self.a.symbols[i - 1], self.b.symbols[j - 1])
    }
}
