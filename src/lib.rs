//! # wavefront-sw
//!
//! 多核锁步的波前 Smith-Waterman 局部比对。
//!
//! DP 矩阵按反对角线逐条推进：同一条对角线上的单元格互不依赖，
//! 被切分成互不相交的区间分给各核心；每条对角线结束后全体核心过一次全屏障，
//! 保证下一条对角线开始前其依赖（d-1、d-2）已经写完并可见。
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use wavefront_sw::config::RunConfig;
//! use wavefront_sw::driver::LockstepDriver;
//! use wavefront_sw::store::SequenceStore;
//!
//! let cfg = RunConfig::with_cores(4);
//! let store = SequenceStore::from_bytes(b"GATTACA", b"TACGATTAC", cfg.max_sequence_length)?;
//! let mut driver = LockstepDriver::new(cfg, store)?;
//! let report = driver.run();
//! println!("best score {}", report.best.score);
//! # Ok::<(), wavefront_sw::error::ConfigError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`wavefront`] — 对角线调度、核心分段、单元格递推
//! - [`matrix`] — 共享 DP 矩阵与分段写入视图
//! - [`driver`] — 锁步驱动（SPMD + 屏障）
//! - [`host`] — 核心身份、周期计数、屏障等宿主服务
//! - [`reduce`] — 最高分归约与矩阵摘录
//! - [`sequential`] — 行优先的顺序参照实现
//! - [`store`] / [`io`] — 序列存储与 FASTA 读取
//! - [`config`] / [`error`] / [`report`] — 配置、错误与运行报告

pub mod config;
pub mod driver;
pub mod error;
pub mod host;
pub mod io;
pub mod matrix;
pub mod reduce;
pub mod report;
pub mod sequential;
pub mod store;
pub mod wavefront;
