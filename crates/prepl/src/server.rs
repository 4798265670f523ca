/*!
* 文件名: server.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, tracing
* 描述: 会话启动入口与服务句柄 / Session entry point and server handle
*/

use crate::config::ReplOptions;
use crate::context::SharedContext;
use crate::driver::Session;
use crate::errors::{ReplError, ReplResult};
use crate::evaluator::Evaluator;
use crate::interrupt::InterruptHandle;
use crate::lifecycle::{SessionResult, SessionState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// 运行中的REPL会话句柄 / Handle to a running REPL session
#[derive(Debug)]
pub struct ReplServer {
    context: SharedContext,
    interrupt: InterruptHandle,
    state: watch::Receiver<SessionState>,
    completion: JoinHandle<SessionResult>,
}

impl ReplServer {
    /// 会话上下文，可在迭代之间注入绑定 / Session context, embedders may inject bindings between iterations
    pub fn context(&self) -> SharedContext {
        self.context.clone()
    }

    /// 发送中断 / Deliver an interrupt to the session
    pub fn interrupt(&self) {
        self.interrupt.interrupt();
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// 当前状态 / Current session state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// 等待会话结束 / Wait for the session to end.
    ///
    /// Consumes the handle, so the completion is observed exactly once.
    pub async fn wait(self) -> SessionResult {
        match self.completion.await {
            Ok(result) => result,
            Err(err) => Err(ReplError::protocol(format!("session task failed: {}", err))),
        }
    }
}

/// 启动REPL会话 / Start a REPL session on the current tokio runtime.
///
/// Configuration errors are returned here; everything afterwards is reported
/// through [`ReplServer::wait`].
pub fn start<E: Evaluator>(options: ReplOptions, evaluator: E) -> ReplResult<ReplServer> {
    let session = Session::new(options, evaluator)?;
    let context = session.context();
    let interrupt = session.interrupt_handle();
    let state = session.subscribe();

    info!("starting REPL session");
    let completion = tokio::spawn(session.run());

    Ok(ReplServer {
        context,
        interrupt,
        state,
        completion,
    })
}
