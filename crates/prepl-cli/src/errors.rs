/*!
* 文件名: errors.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: thiserror, prepl
* 描述: CLI错误类型 / CLI error types
*/

use prepl::ReplError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    /// 会话错误 / Session error
    Repl(#[from] ReplError),

    #[error("IO error: {0}")]
    /// IO错误 / IO error
    Io(#[from] std::io::Error),

    #[error("Invalid binding: {0}")]
    /// 绑定参数无效 / Malformed binding argument
    InvalidBinding(String),

    #[error("Logging setup failed: {0}")]
    /// 日志初始化失败 / Logging could not be initialised
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: CliError = std::io::Error::other("no threads").into();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(err.to_string(), "IO error: no threads");
    }
}
