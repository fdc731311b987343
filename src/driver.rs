//! 锁步驱动：逐条反对角线计算，每条对角线之后全体活跃核心过一次屏障。
//!
//! 每个核心执行同一个过程（SPMD），只按自身编号分支：
//!
//! ```text
//! Init ──Start──▶ ComputeDiagonal(1) ──Diagonal──▶ … ComputeDiagonal(d_last) ──Finish──▶ Finalize
//! ```
//!
//! 开启逐对角线计时时，每条对角线的 `Diagonal` 屏障之后由核心 0 汇总计时，
//! 再过一次 `Timing` 屏障；计时槽在下一条对角线会被覆盖，所以这道屏障此时是必需的。

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::{ConfigError, Result};
use crate::host::{CoreContext, CycleCounter, Host, MonotonicClock, PhaseBarrier};
use crate::matrix::DpMatrix;
use crate::reduce;
use crate::report::{RunMeta, RunReport, SequenceSummary};
use crate::store::SequenceStore;
use crate::wavefront::{score_cell, segment_for, Diagonal, Diagonals};

/// 一次运行中的屏障调用点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierSite {
    Start,
    Diagonal,
    Timing,
    Finish,
}

impl fmt::Display for BarrierSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BarrierSite::Start => "start",
            BarrierSite::Diagonal => "diagonal",
            BarrierSite::Timing => "timing",
            BarrierSite::Finish => "finish",
        };
        f.write_str(s)
    }
}

/// 各屏障调用点及其参与者数。
///
/// 同一阶段内所有调用点必须使用同一个参与者数（活跃核心数），
/// 否则会在运行期死锁或漏计，因此在初始化时校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    sites: Vec<(BarrierSite, usize)>,
}

impl PhasePlan {
    pub fn for_config(cfg: &RunConfig) -> Self {
        let mut sites = vec![
            (BarrierSite::Start, cfg.active_cores),
            (BarrierSite::Diagonal, cfg.active_cores),
        ];
        if cfg.trace_diagonals {
            sites.push((BarrierSite::Timing, cfg.active_cores));
        }
        sites.push((BarrierSite::Finish, cfg.active_cores));
        Self { sites }
    }

    /// 设置（或新增）某个调用点的参与者数。
    pub fn with_site(mut self, site: BarrierSite, participants: usize) -> Self {
        match self.sites.iter_mut().find(|(s, _)| *s == site) {
            Some(entry) => entry.1 = participants,
            None => self.sites.push((site, participants)),
        }
        self
    }

    pub fn without_site(mut self, site: BarrierSite) -> Self {
        self.sites.retain(|(s, _)| *s != site);
        self
    }

    pub fn participants(&self, site: BarrierSite) -> Option<usize> {
        self.sites.iter().find(|(s, _)| *s == site).map(|&(_, p)| p)
    }

    /// 校验通过时返回统一的参与者数。
    pub fn validate(&self, cfg: &RunConfig) -> Result<usize> {
        if self.sites.is_empty() {
            return Err(ConfigError::EmptyPhasePlan);
        }
        let mut required = vec![BarrierSite::Start, BarrierSite::Diagonal, BarrierSite::Finish];
        if cfg.trace_diagonals {
            required.push(BarrierSite::Timing);
        }
        for site in required {
            if self.participants(site).is_none() {
                return Err(ConfigError::MissingBarrier(site));
            }
        }
        let expected = cfg.active_cores;
        for &(site, found) in &self.sites {
            if found != expected {
                return Err(ConfigError::BarrierMismatch { site, expected, found });
            }
        }
        Ok(expected)
    }
}

/// 单个核心的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    ComputeDiagonal(usize),
    Finalize,
}

impl DriverState {
    /// 合法迁移：对角线编号严格递增，Finalize 之后不再迁移。
    fn advance(self, next: DriverState) -> DriverState {
        let ok = match (self, next) {
            (DriverState::Init, DriverState::ComputeDiagonal(_)) => true,
            (DriverState::ComputeDiagonal(a), DriverState::ComputeDiagonal(b)) => b > a,
            (DriverState::Init | DriverState::ComputeDiagonal(_), DriverState::Finalize) => true,
            _ => false,
        };
        debug_assert!(ok, "illegal driver transition {:?} -> {:?}", self, next);
        next
    }
}

/// 单个核心的累计统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub core: usize,
    /// 写入的单元格数
    pub cells: u64,
    /// 分到非空区间的对角线数
    pub diagonals: u64,
    pub compute_cycles: u64,
}

/// 核心 0 汇总的一条对角线计时。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagonalTiming {
    pub diagonal: usize,
    pub len: usize,
    /// 实际分到元素的核心数
    pub working_cores: usize,
    /// 最慢核心的区间耗时
    pub compute_cycles: u64,
    /// 对角线跨度减去最慢核心耗时
    pub sync_cycles: u64,
}

#[derive(Debug, Default)]
struct TimingSlot {
    busy: AtomicBool,
    start: AtomicU64,
    end: AtomicU64,
}

/// 每核心一个计时槽，只由所属核心写入；核心 0 在屏障之后读取。
#[derive(Debug)]
struct TimingBoard {
    slots: Vec<TimingSlot>,
}

impl TimingBoard {
    fn new(cores: usize) -> Self {
        Self {
            slots: (0..cores).map(|_| TimingSlot::default()).collect(),
        }
    }

    fn record(&self, core: usize, start: u64, end: u64) {
        let slot = &self.slots[core];
        slot.start.store(start, Ordering::Relaxed);
        slot.end.store(end, Ordering::Relaxed);
        slot.busy.store(true, Ordering::Relaxed);
    }

    fn idle(&self, core: usize) {
        self.slots[core].busy.store(false, Ordering::Relaxed);
    }

    fn aggregate(&self, diag: &Diagonal) -> Option<DiagonalTiming> {
        let mut earliest = u64::MAX;
        let mut latest = 0u64;
        let mut slowest = 0u64;
        let mut working = 0usize;
        for slot in self.slots.iter().filter(|s| s.busy.load(Ordering::Relaxed)) {
            let start = slot.start.load(Ordering::Relaxed);
            let end = slot.end.load(Ordering::Relaxed);
            earliest = earliest.min(start);
            latest = latest.max(end);
            slowest = slowest.max(end - start);
            working += 1;
        }
        if working == 0 {
            return None;
        }
        Some(DiagonalTiming {
            diagonal: diag.index,
            len: diag.len,
            working_cores: working,
            compute_cycles: slowest,
            sync_cycles: (latest - earliest).saturating_sub(slowest),
        })
    }
}

struct CoreReport {
    stats: CoreStats,
    sweep_cycles: u64,
    timings: Vec<DiagonalTiming>,
}

enum CoreOutcome {
    Parked,
    Finished(CoreReport),
}

/// 锁步驱动。独占 DP 矩阵；运行期间以共享引用交给所有核心。
pub struct LockstepDriver {
    config: RunConfig,
    store: SequenceStore,
    matrix: DpMatrix,
    host: Host,
    participants: usize,
    clock: Box<dyn CycleCounter>,
}

impl LockstepDriver {
    pub fn new(config: RunConfig, store: SequenceStore) -> Result<Self> {
        let plan = PhasePlan::for_config(&config);
        Self::with_plan(config, store, &plan)
    }

    pub fn with_plan(config: RunConfig, store: SequenceStore, plan: &PhasePlan) -> Result<Self> {
        config.validate()?;
        let participants = plan.validate(&config)?;
        for (which, len) in [('a', store.m()), ('b', store.n())] {
            if len > config.max_sequence_length {
                return Err(ConfigError::SequenceTooLong {
                    which,
                    len,
                    max: config.max_sequence_length,
                });
            }
        }

        let host = Host::new(config.host_cores)?;
        let matrix = if config.audit_writes {
            DpMatrix::with_audit(store.m(), store.n())
        } else {
            DpMatrix::new(store.m(), store.n())
        };
        Ok(Self {
            config,
            store,
            matrix,
            host,
            participants,
            clock: Box::new(MonotonicClock::new()),
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn CycleCounter>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn matrix(&self) -> &DpMatrix {
        &self.matrix
    }

    /// 执行一次完整扫描并归约结果。可重复调用，每次都从清零的矩阵开始。
    pub fn run(&mut self) -> RunReport {
        let this: &Self = self;
        let (m, n) = (this.store.m(), this.store.n());
        info!(
            "wavefront sweep: m={} n={} active_cores={} host_cores={} edge_policy={}",
            m,
            n,
            this.config.active_cores,
            this.host.core_count(),
            this.config.edge_policy
        );

        let barrier = PhaseBarrier::new(this.participants);
        let timings = TimingBoard::new(this.config.active_cores);

        let t0 = this.clock.cycles();
        let outcomes = this.host.spmd(|core| this.run_core(core, &barrier, &timings));
        let total_cycles = this.clock.cycles().saturating_sub(t0);

        let mut cores = Vec::with_capacity(this.config.active_cores);
        let mut sweep_cycles = 0;
        let mut diagonal_timings = Vec::new();
        for outcome in outcomes {
            if let CoreOutcome::Finished(report) = outcome {
                if report.stats.core == 0 {
                    sweep_cycles = report.sweep_cycles;
                    diagonal_timings = report.timings;
                }
                cores.push(report.stats);
            }
        }
        let cells_updated: u64 = cores.iter().map(|c| c.cells).sum();
        debug_assert_eq!(cells_updated, (m * n) as u64);

        let best = if this.config.parallel_reduce {
            this.host.install(|| reduce::best_cell_parallel(&this.matrix))
        } else {
            reduce::best_cell(&this.matrix)
        };
        let excerpt = this
            .config
            .excerpt
            .map(|(rows, cols)| reduce::excerpt(&this.matrix, rows, cols));
        info!(
            "sweep finished: best score {} at ({}, {}), {} cells in {} cycles",
            best.score, best.i, best.j, cells_updated, total_cycles
        );

        RunReport {
            seq_a: SequenceSummary::of(this.store.a()),
            seq_b: SequenceSummary::of(this.store.b()),
            config: this.config.clone(),
            host_cores: this.host.core_count(),
            best,
            diagonals: Diagonals::new(m, n).count(),
            cells_updated,
            total_cycles,
            sweep_cycles,
            cores,
            diagonal_timings,
            excerpt,
            meta: RunMeta {
                created: Some(chrono::Utc::now().to_rfc3339()),
                command: None,
            },
        }
    }

    fn rendezvous(&self, barrier: &PhaseBarrier, site: BarrierSite, core: usize) {
        trace!("core {} waiting at {} barrier", core, site);
        barrier.wait();
    }

    fn run_core(&self, core: CoreContext, barrier: &PhaseBarrier, timings: &TimingBoard) -> CoreOutcome {
        let active = self.config.active_cores;
        if core.id >= active {
            trace!("core {} of {} parked", core.id, core.host_cores);
            return CoreOutcome::Parked;
        }

        let mut state = DriverState::Init;
        if core.id == 0 {
            self.matrix.clear();
        }
        self.rendezvous(barrier, BarrierSite::Start, core.id);

        let scoring = self.config.scoring;
        let policy = self.config.edge_policy;
        let mut stats = CoreStats {
            core: core.id,
            ..CoreStats::default()
        };
        let mut diag_timings = Vec::new();

        let sweep_start = self.clock.cycles();
        for diag in Diagonals::new(self.store.m(), self.store.n()) {
            state = state.advance(DriverState::ComputeDiagonal(diag.index));

            match segment_for(diag.len, active, core.id) {
                Some(seg) => {
                    let start = self.clock.cycles();
                    let view = self.matrix.segment(diag, seg);
                    for (k, i, j) in view.cells() {
                        let (a, b) = self.store.pair(i, j);
                        let nb = self.matrix.neighbors(i, j);
                        view.write(k, score_cell(policy, i, j, a, b, nb, &scoring));
                    }
                    let end = self.clock.cycles();
                    timings.record(core.id, start, end);
                    stats.cells += seg.len() as u64;
                    stats.diagonals += 1;
                    stats.compute_cycles += end.saturating_sub(start);
                }
                None => timings.idle(core.id),
            }

            self.rendezvous(barrier, BarrierSite::Diagonal, core.id);

            if self.config.trace_diagonals {
                if core.id == 0 {
                    if let Some(t) = timings.aggregate(&diag) {
                        debug!(
                            "diagonal {} (len {}, {} cores): compute {} cycles, sync {} cycles",
                            t.diagonal, t.len, t.working_cores, t.compute_cycles, t.sync_cycles
                        );
                        diag_timings.push(t);
                    }
                }
                self.rendezvous(barrier, BarrierSite::Timing, core.id);
            }
        }
        let sweep_cycles = self.clock.cycles().saturating_sub(sweep_start);

        state = state.advance(DriverState::Finalize);
        trace!("core {} reached {:?}", core.id, state);
        self.rendezvous(barrier, BarrierSite::Finish, core.id);

        CoreOutcome::Finished(CoreReport {
            stats,
            sweep_cycles,
            timings: diag_timings,
        })
    }
}

impl fmt::Debug for LockstepDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockstepDriver")
            .field("config", &self.config)
            .field("m", &self.store.m())
            .field("n", &self.store.n())
            .field("host", &self.host)
            .finish()
    }
}
