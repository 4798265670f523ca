/*!
* 文件名: args.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: clap, prepl
* 描述: 命令行参数 / Command line arguments
*/

use crate::errors::CliResult;
use crate::utils::{parse_binding, parse_bindings};
use clap::Parser;
use prepl::config::{DEFAULT_CONTINUATION_PROMPT, DEFAULT_PROMPT};
use prepl::{InputSource, ReplOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prepl")]
#[command(version, about = "Promise-driven REPL for a small JSON expression language", long_about = None)]
pub struct Args {
    /// Read input lines from FILE instead of stdin
    pub file: Option<PathBuf>,

    /// Primary prompt
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Prompt shown while a multi-line input is incomplete
    #[arg(long, default_value = DEFAULT_CONTINUATION_PROMPT)]
    pub continuation_prompt: String,

    /// Initial binding, repeatable
    #[arg(short, long = "bind", value_name = "NAME=JSON")]
    pub bind: Vec<String>,

    /// Initial bindings as a JSON object or "k1:v1,k2:v2"
    #[arg(long, value_name = "JSON|K:V,...")]
    pub bindings: Option<String>,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Log filter used when PREPL_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// 转换为会话配置 / Build the session options
    pub fn to_options(&self) -> CliResult<ReplOptions> {
        let mut options = ReplOptions::new()
            .with_prompt(self.prompt.clone())
            .with_continuation_prompt(self.continuation_prompt.clone());

        if let Some(path) = &self.file {
            options = options.with_input(InputSource::File(path.clone()));
        }
        // --bindings 先合并，--bind 可覆盖 / --bind entries override --bindings
        if let Some(text) = &self.bindings {
            options = options.with_bindings(parse_bindings(text)?);
        }
        for text in &self.bind {
            let (name, value) = parse_binding(text)?;
            options = options.with_binding(name, value);
        }
        if self.no_color {
            options = options.with_colors(false);
        }

        Ok(options)
    }
}
