use thiserror::Error;

use crate::driver::BarrierSite;

/// 初始化阶段可检测的配置错误。
///
/// 运行期不存在可恢复错误：某个核心永远不到达屏障时整组停滞，
/// 这是目标执行模型的既定行为，不在此建模。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sequence {which} has length {len}, exceeding max_sequence_length {max}")]
    SequenceTooLong { which: char, len: usize, max: usize },

    #[error("max_sequence_length must be at least 1")]
    ZeroLengthBound,

    #[error("active core count must be at least 1")]
    NoActiveCores,

    #[error("requested {requested} active cores but the host only has {host}")]
    TooManyCores { requested: usize, host: usize },

    #[error("barrier at {site} expects {found} participants, phase uses {expected}")]
    BarrierMismatch {
        site: BarrierSite,
        expected: usize,
        found: usize,
    },

    #[error("phase plan has no barrier sites")]
    EmptyPhasePlan,

    #[error("phase plan is missing the {0} barrier")]
    MissingBarrier(BarrierSite),

    #[error("excerpt of {rows}x{cols} exceeds the {max}x{max} limit")]
    ExcerptTooLarge { rows: usize, cols: usize, max: usize },

    #[error("score magnitude {magnitude} over sequences of length {max_len} can exceed {limit}")]
    ScoreRange { magnitude: u32, max_len: usize, limit: i32 },

    #[error("cannot start host thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
