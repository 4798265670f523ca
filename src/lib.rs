//! # promise-repl
//!
//! A promise-driven REPL harness: an asynchronous line reader, a
//! read-eval-print driver that awaits pending results before printing them,
//! multi-line accumulation for incomplete input, and a session lifecycle that
//! ends on end of input or on an interrupt.
//!
//! ## Features
//!
//! - **script** (default) - the reference expression-language evaluator
//!
//! ## Example
//!
//! ```rust,no_run
//! use promise_repl::{start, InputSource, ReplOptions};
//! use promise_repl::prepl_script::ScriptEvaluator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ReplOptions::new()
//!         .with_input(InputSource::Text("x = delay(10, 41)\nx + 1\n".into()))
//!         .with_prompt("node > ");
//!
//!     let server = start(options, ScriptEvaluator::new())?;
//!     let end = server.wait().await?;
//!     println!("session ended: {}", end);
//!     Ok(())
//! }
//! ```

// Re-export the core driver (always available)
pub use prepl::*;

// Re-export optional components based on features
#[cfg(feature = "script")]
pub use prepl_script;

// Re-export commonly used dependencies for convenience
pub use serde_json;
pub use thiserror;
pub use tokio;
pub use tracing;
