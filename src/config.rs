use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// 摘录矩阵的最大边长（含零边界之外的行列数）。
pub const MAX_EXCERPT: usize = 32;

/// 线性间隙打分参数。三个值都按有符号数直接相加，
/// 因此罚分应写成负数（例如 `gap_score = -2`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringParams {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl ScoringParams {
    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    /// 三个常数中绝对值最大者。
    pub fn magnitude(&self) -> u32 {
        self.match_score
            .unsigned_abs()
            .max(self.mismatch_score.unsigned_abs())
            .max(self.gap_score.unsigned_abs())
    }

    /// 长度不超过 `max_len` 的两条序列上，任意单元格及其候选值的绝对值上界。
    ///
    /// (i, j) 处的分数来自一条至多 i + j - 1 步的路径，每步至多增加 magnitude，
    /// 候选值再加一步；所以上界是 magnitude·(2·max_len + 1)。溢出 u64 时返回 None。
    pub fn score_bound(&self, max_len: usize) -> Option<u64> {
        let steps = (max_len as u64).checked_mul(2)?.checked_add(1)?;
        u64::from(self.magnitude()).checked_mul(steps)
    }
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -2,
        }
    }
}

/// 首行 / 首列单元格的递推公式。
///
/// - `Standard`：标准带边界递推，边界格视为 0，`up + gap` 与 `left + gap` 照常参与比较。
/// - `GapConstant`：无边界 m×n 版本的写法，首行 / 首列直接用 gap 常数代替越界邻居。
/// - `ZeroCandidate`：早期带边界版本的写法，首行的删除候选、首列的插入候选取 0。
///
/// 三者在 `gap_score <= 0` 时结果一致；`GapConstant` 始终与标准递推一致，
/// `ZeroCandidate` 在 gap 为正且高于错配分时会得到不同的首行 / 首列。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgePolicy {
    #[default]
    Standard,
    GapConstant,
    ZeroCandidate,
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgePolicy::Standard => "standard",
            EdgePolicy::GapConstant => "gap-constant",
            EdgePolicy::ZeroCandidate => "zero-candidate",
        };
        f.write_str(name)
    }
}

impl FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "standard" => Ok(EdgePolicy::Standard),
            "gap-constant" => Ok(EdgePolicy::GapConstant),
            "zero-candidate" => Ok(EdgePolicy::ZeroCandidate),
            other => Err(format!(
                "unknown edge policy '{}' (expected standard, gap-constant or zero-candidate)",
                other
            )),
        }
    }
}

/// 一次运行的全部静态配置，初始化时校验，运行期间不可变。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub scoring: ScoringParams,
    /// 序列长度上限，决定矩阵规模上限
    pub max_sequence_length: usize,
    /// 参与计算与屏障的核心数
    pub active_cores: usize,
    /// 宿主核心总数；编号 >= active_cores 的核心整个运行期间停放
    pub host_cores: usize,
    pub edge_policy: EdgePolicy,
    /// 逐对角线汇总计时（需要每条对角线的第二道屏障）
    pub trace_diagonals: bool,
    pub parallel_reduce: bool,
    /// 记录每个单元格的写入次数，用于校验“恰好写一次”
    pub audit_writes: bool,
    /// 左上角摘录 (rows, cols)
    pub excerpt: Option<(usize, usize)>,
}

impl RunConfig {
    pub fn with_cores(active_cores: usize) -> Self {
        Self {
            active_cores,
            host_cores: active_cores,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sequence_length == 0 {
            return Err(ConfigError::ZeroLengthBound);
        }
        if self.active_cores == 0 {
            return Err(ConfigError::NoActiveCores);
        }
        if self.active_cores > self.host_cores {
            return Err(ConfigError::TooManyCores {
                requested: self.active_cores,
                host: self.host_cores,
            });
        }
        let within = self
            .scoring
            .score_bound(self.max_sequence_length)
            .is_some_and(|b| b <= i32::MAX as u64);
        if !within {
            return Err(ConfigError::ScoreRange {
                magnitude: self.scoring.magnitude(),
                max_len: self.max_sequence_length,
                limit: i32::MAX,
            });
        }
        if let Some((rows, cols)) = self.excerpt {
            if rows > MAX_EXCERPT || cols > MAX_EXCERPT {
                return Err(ConfigError::ExcerptTooLarge {
                    rows,
                    cols,
                    max: MAX_EXCERPT,
                });
            }
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringParams::default(),
            max_sequence_length: 100,
            active_cores: 4,
            host_cores: 4,
            edge_policy: EdgePolicy::Standard,
            trace_diagonals: false,
            parallel_reduce: false,
            audit_writes: false,
            excerpt: Some((10, 10)),
        }
    }
}

/// 两个历史演示配置，序列与常数保持原样。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// 40×100，4 核，带边界矩阵，负罚分
    Diag40x100,
    /// 40×20，32 核，无边界写法，正的错配 / gap 常数，逐对角线计时。
    ///
    /// 只沿用该演示的序列、常数与首行 / 首列公式。它在 d >= 20 时的遍历会算出负的列号、
    /// 跳过部分内部单元格；这里按正常的对角线遍历填满整张矩阵。
    Diag20x40Cc32,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Diag40x100, Preset::Diag20x40Cc32];

    pub fn sequences(&self) -> (&'static [u8], &'static [u8]) {
        match self {
            Preset::Diag40x100 => (
                b"CCGGGGGGATCACCGCGGGCCTCCGCCGGTAGCTTGCGAT",
                b"AATCAATGAACACCGCATACCCTATTGTTGAAAGCGCTACGATCGTGATTTACTATCGTGCTCGACTGCAATGAGCCTAACGAAAAGTCGTGCTAGAACT",
            ),
            Preset::Diag20x40Cc32 => (
                b"GATGGGCGTGCCAAAGGAGATCGGACGAAATGGATTTCGA",
                b"TGCGGGCCAAGATAGGCGGT",
            ),
        }
    }

    pub fn config(&self) -> RunConfig {
        match self {
            Preset::Diag40x100 => RunConfig {
                scoring: ScoringParams {
                    match_score: 2,
                    mismatch_score: -1,
                    gap_score: -2,
                },
                max_sequence_length: 100,
                edge_policy: EdgePolicy::ZeroCandidate,
                ..RunConfig::with_cores(4)
            },
            Preset::Diag20x40Cc32 => RunConfig {
                scoring: ScoringParams {
                    match_score: 2,
                    mismatch_score: 1,
                    gap_score: 1,
                },
                max_sequence_length: 200,
                edge_policy: EdgePolicy::GapConstant,
                trace_diagonals: true,
                excerpt: None,
                ..RunConfig::with_cores(32)
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Diag40x100 => f.write_str("diag40x100"),
            Preset::Diag20x40Cc32 => f.write_str("diag20x40-cc32"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| format!("unknown preset '{}' (expected diag40x100 or diag20x40-cc32)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
        for p in Preset::ALL {
            assert!(p.config().validate().is_ok(), "{}", p);
        }
    }

    #[test]
    fn rejects_core_counts() {
        let cfg = RunConfig {
            active_cores: 0,
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NoActiveCores)));

        let cfg = RunConfig {
            active_cores: 8,
            host_cores: 4,
            ..RunConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooManyCores { requested: 8, host: 4 })
        ));
    }

    #[test]
    fn rejects_zero_bound_and_large_excerpt() {
        let cfg = RunConfig {
            max_sequence_length: 0,
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroLengthBound)));

        let cfg = RunConfig {
            excerpt: Some((MAX_EXCERPT + 1, 4)),
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ExcerptTooLarge { .. })));
    }

    #[test]
    fn rejects_scores_that_can_overflow() {
        // 2·8 + 1 = 17 步
        let limit = i32::MAX / 17;
        let at = |magnitude: i32| RunConfig {
            scoring: ScoringParams {
                match_score: magnitude,
                mismatch_score: -1,
                gap_score: -2,
            },
            max_sequence_length: 8,
            ..RunConfig::default()
        };
        assert!(at(limit).validate().is_ok());
        assert!(matches!(
            at(limit + 1).validate(),
            Err(ConfigError::ScoreRange { max_len: 8, .. })
        ));
        assert!(at(i32::MAX / 2 + 1).validate().is_err());

        let cfg = RunConfig {
            scoring: ScoringParams {
                match_score: 2,
                mismatch_score: i32::MIN,
                gap_score: -2,
            },
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ScoreRange { magnitude, .. }) if magnitude == 1 << 31));
    }

    #[test]
    fn score_bound_saturates_to_none() {
        let s = ScoringParams {
            match_score: i32::MAX,
            mismatch_score: 0,
            gap_score: 0,
        };
        assert_eq!(s.score_bound(0), Some(i32::MAX as u64));
        assert_eq!(s.score_bound(usize::MAX), None);
    }

    #[test]
    fn preset_names_round_trip() {
        for p in Preset::ALL {
            assert_eq!(p.to_string().parse::<Preset>(), Ok(p));
        }
        assert!("diag".parse::<Preset>().is_err());
        assert_eq!("gap-constant".parse::<EdgePolicy>(), Ok(EdgePolicy::GapConstant));
    }

    #[test]
    fn preset_sequences_fit_their_bounds() {
        for p in Preset::ALL {
            let (a, b) = p.sequences();
            let cfg = p.config();
            assert!(a.len() <= cfg.max_sequence_length);
            assert!(b.len() <= cfg.max_sequence_length);
        }
        assert_eq!(Preset::Diag40x100.sequences().1.len(), 100);
    }

    #[test]
    fn substitution_uses_signed_constants() {
        let s = ScoringParams::default();
        assert_eq!(s.substitution(b'A', b'A'), 2);
        assert_eq!(s.substitution(b'A', b'C'), -1);
    }
}
