/*!
* 文件名: evaluator.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/14
* 版权: 2023 JQQ. All rights reserved.
* 依赖: futures, serde_json
* 描述: 求值器协作方契约 / Evaluator collaborator contract
*/

use crate::context::ExecutionContext;
use crate::errors::{ReplError, ReplResult};
use futures::future::BoxFuture;
use serde_json::Value;

/// 挂起的求值结果 / Evaluation result that settles later
pub type PendingValue = BoxFuture<'static, ReplResult<Option<Value>>>;

/// 单元声明的顶层绑定 / Top-level binding declared by a compiled unit
///
/// The driver, not the evaluator, writes the binding into the context once the
/// unit's value is final, so a pending value is bound only after it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    /// 静默赋值不显示结果 / Silent assignment suppresses display
    pub silent: bool,
}

impl Binding {
    /// `name = expr`, value is displayed
    pub fn assign(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            silent: false,
        }
    }

    /// 声明形式，例如 `let name = expr` / Declaration form, value is not displayed
    pub fn declare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            silent: true,
        }
    }
}

/// 编译结果分类 / Classification of a compile attempt
pub enum Compilation<U> {
    /// 可执行单元 / An executable unit
    Ready { unit: U, binding: Option<Binding> },
    /// 合法前缀，需要更多输入 / Valid prefix of a larger unit, wants more input
    Incomplete,
    /// 真正的语法错误 / Genuine syntax error
    Fatal(ReplError),
}

/// 执行结果 / Outcome of executing a unit
pub enum Execution {
    /// 立即可用的值，`None` 表示没有结果 / Value available now, `None` for no result
    Immediate(Option<Value>),
    /// 稍后完成的值 / Value that settles later
    Pending(PendingValue),
    /// 执行期间抛出的错误 / Error thrown while executing
    Failed(ReplError),
}

impl std::fmt::Debug for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

/// 求值器协作方 / Script compiler and executor consumed by the driver.
///
/// `compile` must not touch the context; `execute` may read and write it but must
/// not perform the unit's declared [`Binding`] itself.
pub trait Evaluator: Send + Sync + 'static {
    type Unit: Send;

    fn compile(&self, source: &str) -> Compilation<Self::Unit>;

    fn execute(&self, unit: Self::Unit, context: &mut ExecutionContext) -> Execution;
}
