/*!
* 文件名: config.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, console, serde_json
* 描述: REPL会话配置 / REPL session configuration
*/

use crate::errors::{ReplError, ReplResult};
use crate::format::{ResultFormatter, ResultTransform};
use serde_json::{Map, Value};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// 默认主提示符 / Default primary prompt
pub const DEFAULT_PROMPT: &str = "> ";
/// 默认续行提示符 / Default continuation prompt
pub const DEFAULT_CONTINUATION_PROMPT: &str = "... ";

pub type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
pub type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// 输入源 / Input source
pub enum InputSource {
    /// 进程标准输入 / The process's standard input
    Stdin,
    /// 任意异步字节流 / Any async byte stream
    Stream(BoxedReader),
    /// 一次性读入的文件 / File read whole at session start
    File(PathBuf),
    /// 固定文本 / Fixed text
    Text(String),
}

impl InputSource {
    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::Stream(Box::new(reader))
    }

    pub(crate) fn is_terminal(&self) -> bool {
        match self {
            Self::Stdin => std::io::stdin().is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("Stdin"),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
        }
    }
}

/// 输出目标 / Output sink
pub enum OutputSink {
    /// 进程标准输出 / The process's standard output
    Stdout,
    /// 进程标准错误 / The process's standard error
    Stderr,
    /// 调用方提供的流，会话结束时关闭 / Caller stream, shut down when the session ends
    Stream(BoxedWriter),
}

impl OutputSink {
    pub fn stream<W>(writer: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::Stream(Box::new(writer))
    }

    pub(crate) fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout => console::Term::stdout().is_term(),
            Self::Stderr => console::Term::stderr().is_term(),
            Self::Stream(_) => false,
        }
    }

    /// 是否为进程默认流 / Whether this is one of the process's own streams
    pub fn is_default(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// REPL会话配置 / REPL session options
pub struct ReplOptions {
    /// 输入源 / Input source
    pub input: InputSource,
    /// 结果输出 / Result output
    pub output: OutputSink,
    /// 错误输出通道 / Error channel
    pub errors: OutputSink,
    /// 主提示符 / Primary prompt
    pub prompt: String,
    /// 续行提示符 / Continuation prompt
    pub continuation_prompt: String,
    /// 初始绑定 / Bindings merged over the seed bindings
    pub initial_bindings: Map<String, Value>,
    /// 结果格式化覆盖 / Result formatter override
    pub formatter: Option<ResultFormatter>,
    /// 打印前的结果变换 / Result transform hook
    pub transform: Option<Arc<dyn ResultTransform>>,
    /// 输入是否为终端（`None` 时自动检测）/ Input terminal override, detected when `None`
    pub input_is_terminal: Option<bool>,
    /// 输出是否为终端（`None` 时自动检测）/ Output terminal override, detected when `None`
    pub output_is_terminal: Option<bool>,
    /// 是否着色（`None` 时仅终端着色）/ Colour override, terminals only when `None`
    pub colors: Option<bool>,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            input: InputSource::Stdin,
            output: OutputSink::Stdout,
            errors: OutputSink::Stderr,
            prompt: DEFAULT_PROMPT.to_string(),
            continuation_prompt: DEFAULT_CONTINUATION_PROMPT.to_string(),
            initial_bindings: Map::new(),
            formatter: None,
            transform: None,
            input_is_terminal: None,
            output_is_terminal: None,
            colors: None,
        }
    }
}

impl std::fmt::Debug for ReplOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplOptions")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("errors", &self.errors)
            .field("prompt", &self.prompt)
            .field("continuation_prompt", &self.continuation_prompt)
            .field("initial_bindings", &self.initial_bindings)
            .field("formatter", &self.formatter.is_some())
            .field("transform", &self.transform.is_some())
            .field("colors", &self.colors)
            .finish()
    }
}

impl ReplOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }

    pub fn with_errors(mut self, errors: OutputSink) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_continuation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.continuation_prompt = prompt.into();
        self
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: Value) -> Self {
        self.initial_bindings.insert(name.into(), value);
        self
    }

    pub fn with_bindings(mut self, bindings: Map<String, Value>) -> Self {
        self.initial_bindings.extend(bindings);
        self
    }

    pub fn with_formatter(mut self, formatter: ResultFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn ResultTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// 同时覆盖输入输出的终端检测 / Override terminal detection for both ends
    pub fn with_terminal(mut self, input: bool, output: bool) -> Self {
        self.input_is_terminal = Some(input);
        self.output_is_terminal = Some(output);
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn validate(&self) -> ReplResult<()> {
        if self.prompt.is_empty() {
            return Err(ReplError::InvalidConfiguration(
                "prompt must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn input_is_terminal(&self) -> bool {
        self.input_is_terminal
            .unwrap_or_else(|| self.input.is_terminal())
    }

    pub(crate) fn output_is_terminal(&self) -> bool {
        self.output_is_terminal
            .unwrap_or_else(|| self.output.is_terminal())
    }
}
