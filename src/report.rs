use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::driver::{CoreStats, DiagonalTiming};
use crate::reduce::{BestCell, Excerpt};
use crate::store::Sequence;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub name: String,
    pub len: usize,
    pub symbols: String,
}

impl SequenceSummary {
    pub fn of(seq: &Sequence) -> Self {
        Self {
            name: seq.name.clone(),
            len: seq.len(),
            symbols: String::from_utf8_lossy(seq.symbols()).into_owned(),
        }
    }
}

/// 运行元信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    pub created: Option<String>,
    pub command: Option<String>,
}

/// 一次锁步扫描的结果与诊断信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub seq_a: SequenceSummary,
    pub seq_b: SequenceSummary,
    pub config: RunConfig,
    pub host_cores: usize,
    pub best: BestCell,
    /// 非空对角线数
    pub diagonals: usize,
    pub cells_updated: u64,
    /// 驱动视角：从派发到全部核心返回
    pub total_cycles: u64,
    /// 核心 0 视角：对角线循环本身
    pub sweep_cycles: u64,
    pub cores: Vec<CoreStats>,
    /// 仅在逐对角线计时时非空
    pub diagonal_timings: Vec<DiagonalTiming>,
    pub excerpt: Option<Excerpt>,
    pub meta: RunMeta,
}

impl RunReport {
    pub fn core0_compute_cycles(&self) -> u64 {
        self.cores.iter().find(|c| c.core == 0).map_or(0, |c| c.compute_cycles)
    }

    /// 逐对角线汇总的 (compute, sync) 总和。
    pub fn traced_totals(&self) -> (u64, u64) {
        self.diagonal_timings
            .iter()
            .fold((0, 0), |(c, s), t| (c + t.compute_cycles, s + t.sync_cycles))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let mut f = std::fs::File::create(path)?;
        bincode::serialize_into(&mut f, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let report: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        Ok(report)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequence 1: {} (Length: {})", self.seq_a.symbols, self.seq_a.len)?;
        writeln!(f, "Sequence 2: {} (Length: {})", self.seq_b.symbols, self.seq_b.len)?;
        writeln!(
            f,
            "Using {} cores ({} on host), edge policy {}",
            self.config.active_cores, self.host_cores, self.config.edge_policy
        )?;
        writeln!(
            f,
            "Scoring: match {} mismatch {} gap {}",
            self.config.scoring.match_score, self.config.scoring.mismatch_score, self.config.scoring.gap_score
        )?;
        writeln!(f)?;
        writeln!(f, "=== RESULTS ===")?;
        writeln!(f, "Total execution time: {} cycles", self.total_cycles)?;
        writeln!(f, "Sweep time (core 0): {} cycles", self.sweep_cycles)?;
        writeln!(f, "Compute time (core 0): {} cycles", self.core0_compute_cycles())?;
        if !self.diagonal_timings.is_empty() {
            let (compute, sync) = self.traced_totals();
            writeln!(f, "Cycles taken for compute: {}", compute)?;
            writeln!(f, "Cycles taken for synchronization: {}", sync)?;
        }
        writeln!(f, "Diagonals: {}", self.diagonals)?;
        writeln!(f, "Total cell updates made: {}", self.cells_updated)?;
        writeln!(
            f,
            "Maximum alignment score: {} at ({}, {})",
            self.best.score, self.best.i, self.best.j
        )?;
        if let Some(ex) = &self.excerpt {
            writeln!(f)?;
            write!(f, "{}", ex)?;
        }
        if let Some(created) = &self.meta.created {
            writeln!(f)?;
            writeln!(f, "created: {}", created)?;
        }
        Ok(())
    }
}
