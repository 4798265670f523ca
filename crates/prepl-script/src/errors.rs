/*!
* 文件名: errors.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: thiserror, prepl
* 描述: 脚本语言错误类型 / Script language error types
*/

use prepl::ReplError;
use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;

/// 脚本错误 / Errors raised by the script language
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("{0}")]
    /// 语法错误 / Malformed source
    Syntax(String),

    #[error("{0}")]
    /// 运行时错误 / Error thrown during evaluation
    Runtime(String),
}

impl ScriptError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

impl From<ScriptError> for ReplError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::Syntax(msg) => ReplError::Compile(msg),
            ScriptError::Runtime(msg) => ReplError::Runtime(msg),
        }
    }
}

/// 嵌套超限的错误信息 / Message for input nested past the depth limit
pub(crate) const TOO_DEEP: &str = "Maximum nesting depth exceeded";

/// 解析失败 / Parse failure, split by whether more input could fix it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    /// 源码在未完成的结构中结束 / Source ends inside an unfinished construct
    UnexpectedEnd,

    #[error("{0}")]
    /// 无法通过追加输入修复 / Malformed regardless of what follows
    Invalid(String),
}

impl ParseError {
    pub fn unexpected(token: impl std::fmt::Display) -> Self {
        Self::Invalid(format!("Unexpected token '{}'", token))
    }

    pub fn too_deep() -> Self {
        Self::Invalid(TOO_DEEP.to_string())
    }
}

impl From<ParseError> for ScriptError {
    fn from(err: ParseError) -> Self {
        ScriptError::Syntax(err.to_string())
    }
}
