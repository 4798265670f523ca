/*!
* 文件名: evaluator.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: prepl, futures, tracing
* 描述: 脚本语言求值器 / Script language evaluator for the REPL driver
*/

use crate::ast::Statement;
use crate::errors::{ParseError, ScriptError};
use crate::interpreter::Interpreter;
use crate::parser::parse;
use futures::FutureExt;
use prepl::{Binding, Compilation, Evaluator, ExecutionContext, Execution, ReplError};
use tracing::debug;

/// 编译后的单元 / A compiled unit
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    statement: Statement,
}

impl CompiledUnit {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// 单元声明的绑定 / The binding this unit declares, if any
    pub fn binding(&self) -> Option<Binding> {
        match &self.statement {
            Statement::Assign {
                name,
                declare: false,
                ..
            } => Some(Binding::assign(name.clone())),
            Statement::Assign {
                name,
                declare: true,
                ..
            } => Some(Binding::declare(name.clone())),
            _ => None,
        }
    }
}

/// 表达式语言求值器 / Expression language evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEvaluator;

impl ScriptEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ScriptEvaluator {
    type Unit = CompiledUnit;

    fn compile(&self, source: &str) -> Compilation<CompiledUnit> {
        match parse(source) {
            Ok(statement) => {
                let unit = CompiledUnit { statement };
                let binding = unit.binding();
                Compilation::Ready { unit, binding }
            }
            Err(ParseError::UnexpectedEnd) => {
                debug!(len = source.len(), "input incomplete, waiting for more");
                Compilation::Incomplete
            }
            Err(err) => Compilation::Fatal(ScriptError::from(err).into()),
        }
    }

    fn execute(&self, unit: CompiledUnit, context: &mut ExecutionContext) -> Execution {
        let interpreter = Interpreter::new(context.as_map().clone());
        let mut future = async move {
            interpreter
                .run(&unit.statement)
                .await
                .map_err(ReplError::from)
        }
        .boxed();

        // 不含延迟的单元一次轮询即可完成 / units without a delay finish on the first poll
        match (&mut future).now_or_never() {
            Some(Ok(value)) => Execution::Immediate(value),
            Some(Err(err)) => Execution::Failed(err),
            None => Execution::Pending(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_classification() {
        let evaluator = ScriptEvaluator::new();

        for source in ["1 + \n", "x = \n", "[1,\n", "{a: 1,\n", "delay(10,\n"] {
            assert!(
                matches!(evaluator.compile(source), Compilation::Incomplete),
                "expected incomplete for {:?}",
                source
            );
        }

        for source in ["1 1\n", ")\n", "let = 1\n"] {
            match evaluator.compile(source) {
                Compilation::Fatal(err) => {
                    assert!(err.to_string().starts_with("SyntaxError: "), "{}", err)
                }
                _ => panic!("expected fatal for {:?}", source),
            }
        }
    }

    #[test]
    fn test_runaway_nesting_is_fatal() {
        // 未闭合的深层嵌套不再累积 / deep unfinished nesting stops accumulating
        let evaluator = ScriptEvaluator::new();
        match evaluator.compile(&"[".repeat(50_000)) {
            Compilation::Fatal(err) => assert_eq!(
                err.to_string(),
                "SyntaxError: Maximum nesting depth exceeded"
            ),
            _ => panic!("expected fatal for runaway nesting"),
        }
    }

    #[test]
    fn test_compile_reports_bindings() {
        let evaluator = ScriptEvaluator::new();
        let cases = vec![
            ("x = 5\n", Some(Binding::assign("x"))),
            ("let y = 1\n", Some(Binding::declare("y"))),
            ("x == 5\n", None),
        ];

        for (source, expected) in cases {
            match evaluator.compile(source) {
                Compilation::Ready { binding, .. } => {
                    assert_eq!(binding, expected, "binding for {:?}", source)
                }
                _ => panic!("expected ready for {:?}", source),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_immediate_and_pending() {
        let evaluator = ScriptEvaluator::new();
        let mut context = ExecutionContext::new();
        context.set("x", json!(5));

        let Compilation::Ready { unit, .. } = evaluator.compile("x + 1\n") else {
            panic!("expected ready");
        };
        assert!(matches!(
            evaluator.execute(unit, &mut context),
            Execution::Immediate(Some(value)) if value == json!(6)
        ));

        let Compilation::Ready { unit, .. } = evaluator.compile("delay(20, x)\n") else {
            panic!("expected ready");
        };
        match evaluator.execute(unit, &mut context) {
            Execution::Pending(pending) => assert_eq!(pending.await.unwrap(), Some(json!(5))),
            other => panic!("expected pending, got {:?}", other),
        }

        let Compilation::Ready { unit, .. } = evaluator.compile("missing\n") else {
            panic!("expected ready");
        };
        assert!(matches!(
            evaluator.execute(unit, &mut context),
            Execution::Failed(ReplError::Runtime(msg)) if msg == "missing is not defined"
        ));
    }

    #[tokio::test]
    async fn test_execute_does_not_bind() {
        let evaluator = ScriptEvaluator::new();
        let mut context = ExecutionContext::new();

        let Compilation::Ready { unit, .. } = evaluator.compile("z = 3\n") else {
            panic!("expected ready");
        };
        assert!(matches!(
            evaluator.execute(unit, &mut context),
            Execution::Immediate(Some(_))
        ));
        assert!(!context.contains("z"));
    }
}
