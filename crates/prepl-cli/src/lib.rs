/*!
* 文件名: lib.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: clap, console, tokio, tracing
* 描述: prepl命令行前端 / Command line front-end for prepl
*/

pub mod app;
pub mod args;
pub mod errors;
pub mod logging;
pub mod utils;

pub use args::Args;
pub use errors::{CliError, CliResult};

use clap::Parser;
use console::style;
use prepl::SessionEnd;
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::error;

/// 被中断结束时的退出码 / Exit code when the session ends on an interrupt
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// 运行时关闭的等待上限 / Upper bound on waiting for runtime shutdown.
///
/// A stdin read parked on the blocking pool only returns on the next line, so
/// the runtime stops waiting for it after this long.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// 命令行入口，持有运行时 / Command line entry, owns the tokio runtime
pub fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = logging::init_logging(&args.log_level) {
        report(&err);
        return ExitCode::FAILURE;
    }

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(app::run(args));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match outcome {
        Ok(SessionEnd::EndOfInput) => ExitCode::SUCCESS,
        Ok(SessionEnd::Interrupted) => ExitCode::from(INTERRUPTED_EXIT_CODE),
        Err(err) => {
            error!(error = %err, "prepl failed");
            report(&err);
            ExitCode::FAILURE
        }
    }
}

pub fn build_runtime() -> CliResult<Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime)
}

fn report(err: &CliError) {
    eprintln!("{} {}", style("prepl:").red().bold(), err);
}
