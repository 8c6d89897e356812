//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。日志写到 stderr，
//! stdout 留给脚本输出与 `--emit json`。

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use clap::ValueEnum;
use mwscript_config::Phase;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::config::LogConfig;
use crate::error::CliError;

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 构建各阶段 target 的过滤器
pub fn targets(log_config: &LogConfig) -> Targets {
    Phase::ALL
        .iter()
        .fold(Targets::new().with_default(log_config.global), |targets, phase| {
            targets.with_target(phase.target(), log_config.level_for(*phase))
        })
}

/// 使用指定格式和日志配置初始化日志系统；指定文件时同时写入文件
pub fn init_with_file(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<&Path>,
) -> Result<(), CliError> {
    let targets = targets(log_config);

    let mut layers: Vec<BoxedLayer> = vec![format_layer(format, io::stderr, true)
        .with_filter(targets.clone())
        .boxed()];

    if let Some(path) = file {
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        layers.push(
            format_layer(format, Mutex::new(handle), false)
                .with_filter(targets)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Create formatter layer based on format
fn format_layer<W>(format: LogFormat, make_writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}
