/*!
* 文件名: lib.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: Promise驱动REPL核心 / Core of the promise-driven REPL harness
*/

pub mod config;
pub mod context;
pub mod driver;
pub mod errors;
pub mod evaluator;
pub mod format;
pub mod interrupt;
pub mod lifecycle;
pub mod line_reader;
pub mod server;

pub use config::{InputSource, OutputSink, ReplOptions};
pub use context::{ExecutionContext, SharedContext};
pub use driver::Session;
pub use errors::{ReplError, ReplResult};
pub use evaluator::{Binding, Compilation, Evaluator, Execution, PendingValue};
pub use format::{ResultFormatter, ResultTransform};
pub use interrupt::InterruptHandle;
pub use lifecycle::{SessionEnd, SessionResult, SessionState};
pub use line_reader::LineReader;
pub use server::{start, ReplServer};

/// REPL核心的版本号 / Version of the REPL core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
