/*!
* 文件名: errors.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/14
* 版权: 2023 JQQ. All rights reserved.
* 依赖: thiserror
* 描述: REPL核心的错误定义 / Error definitions for the REPL core
*/

use thiserror::Error;

/// REPL核心的Result类型别名 / Result type alias for the REPL core
pub type ReplResult<T> = Result<T, ReplError>;

/// REPL核心的错误类型 / Error type for the REPL core
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Protocol violation: {0}")]
    /// 调用方违反读取协议（并发读取、结束后读取）/ Caller broke the read protocol
    ProtocolViolation(String),

    #[error("SyntaxError: {0}")]
    /// 不可恢复的编译错误 / Fatal compile error
    Compile(String),

    #[error("Error: {0}")]
    /// 脚本执行期间的运行时错误 / Runtime error raised while executing
    Runtime(String),

    #[error("Transport error: {0}")]
    /// 输入或输出流的IO错误 / I/O failure on the input or output stream
    Transport(#[from] std::io::Error),

    #[error("Interrupted")]
    /// 挂起的求值被中断放弃 / Pending evaluation abandoned by an interrupt
    Interrupted,

    #[error("Invalid configuration: {0}")]
    /// 无效配置 / Invalid configuration
    InvalidConfiguration(String),
}

impl ReplError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolViolation(msg.into())
    }

    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// 是否终止会话 / Whether the error ends the session.
    ///
    /// Evaluation failures are recovered per line; only transport failures and
    /// broken wiring stop the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_) | Self::Transport(_))
    }
}
