/*!
* 文件名: app.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, prepl, prepl-script
* 描述: CLI应用程序 / CLI application
*/

use crate::args::Args;
use crate::errors::CliResult;
use prepl::SessionEnd;
use prepl_script::ScriptEvaluator;
use tracing::{debug, info};

/// 运行一次REPL会话 / Run one REPL session.
///
/// Ctrl-C is forwarded to the session as an interrupt for as long as it runs.
pub async fn run(args: Args) -> CliResult<SessionEnd> {
    let options = args.to_options()?;
    debug!(?options, "starting prepl");

    let server = prepl::start(options, ScriptEvaluator::new())?;
    let interrupt = server.interrupt_handle();
    let signals = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupt.interrupt();
        }
    });

    let result = server.wait().await;
    signals.abort();

    let end = result?;
    info!(%end, "prepl finished");
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CliError;
    use clap::Parser;
    use prepl::ReplError;
    use std::ffi::OsStr;
    use std::io::Write;

    #[tokio::test]
    async fn test_run_file_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x = 1 +\n2\nx * 10\n").unwrap();

        let args = Args::try_parse_from([
            OsStr::new("prepl"),
            file.path().as_os_str(),
            OsStr::new("--no-color"),
        ])
        .unwrap();
        assert_eq!(run(args).await.unwrap(), SessionEnd::EndOfInput);
    }

    #[tokio::test]
    async fn test_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let args = Args::try_parse_from([OsStr::new("prepl"), missing.as_os_str()]).unwrap();
        assert!(matches!(
            run(args).await,
            Err(CliError::Repl(ReplError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_rejects_empty_prompt() {
        let args = Args::try_parse_from(["prepl", "--prompt", ""]).unwrap();
        assert!(matches!(
            run(args).await,
            Err(CliError::Repl(ReplError::InvalidConfiguration(_)))
        ));
    }
}
