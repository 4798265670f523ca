/*!
* 文件名: logging.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tracing-subscriber
* 描述: 日志初始化 / Logging setup
*/

use crate::errors::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// 日志过滤环境变量 / Environment variable holding the log filter
pub const LOG_ENV: &str = "PREPL_LOG";

/// 初始化日志，输出到标准错误 / Install the subscriber, writing to stderr.
///
/// `PREPL_LOG` wins over `fallback` when set.
pub fn init_logging(fallback: &str) -> CliResult<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
