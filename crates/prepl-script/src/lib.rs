/*!
* 文件名: lib.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: REPL参考表达式语言 / Reference expression language for the REPL
*/

pub mod ast;
pub mod errors;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use errors::{ParseError, ScriptError, ScriptResult};
pub use evaluator::{CompiledUnit, ScriptEvaluator};
pub use interpreter::Interpreter;
pub use parser::parse;
