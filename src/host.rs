//! 宿主提供的服务：核心身份与数量、周期计数器、全屏障。
//!
//! 宿主用固定大小的 rayon 线程池模拟：每个池线程是一个“核心”，
//! `ThreadPool::broadcast` 让每个核心各执行一次同一段程序（SPMD）。

use std::sync::Barrier;
use std::time::Instant;

use crate::error::Result;

/// 单调不减的周期计数器，只用于诊断。
pub trait CycleCounter: Send + Sync {
    fn cycles(&self) -> u64;
}

/// 以创建时刻为原点的纳秒计数。
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for MonotonicClock {
    #[inline]
    fn cycles(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// 当前核心的身份。`id` 在 [0, host_cores) 内，运行期间不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreContext {
    pub id: usize,
    pub host_cores: usize,
}

/// 固定参与者数的全屏障，可在每条对角线上重复使用。
///
/// 没有超时：任何一个参与者不到达，其余参与者永远阻塞。
/// 屏障同时是内存栅栏，到达前的写入对离开后的所有参与者可见。
#[derive(Debug)]
pub struct PhaseBarrier {
    participants: usize,
    inner: Barrier,
}

impl PhaseBarrier {
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            inner: Barrier::new(participants),
        }
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    /// 阻塞直到全部参与者到达。返回值标记本轮是否为 leader。
    #[inline]
    pub fn wait(&self) -> bool {
        self.inner.wait().is_leader()
    }
}

/// 多核宿主。
pub struct Host {
    pool: rayon::ThreadPool,
}

impl Host {
    pub fn new(cores: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cores)
            .thread_name(|i| format!("core-{}", i))
            .build()?;
        Ok(Self { pool })
    }

    pub fn core_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 在宿主线程池内执行 `f`，其中的 rayon 并行迭代只使用宿主核心。
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(f)
    }

    /// 在每个核心上执行一次 `f`，返回值按核心编号排列。
    pub fn spmd<F, R>(&self, f: F) -> Vec<R>
    where
        F: Fn(CoreContext) -> R + Sync,
        R: Send,
    {
        self.pool.broadcast(|ctx| {
            f(CoreContext {
                id: ctx.index(),
                host_cores: ctx.num_threads(),
            })
        })
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").field("cores", &self.core_count()).finish()
    }
}
