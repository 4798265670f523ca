/*!
* 文件名: lifecycle.rs
* 作者: JQQ
* 创建日期: 2026/10/13
* 最后修改日期: 2026/10/14
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, tracing
* 描述: 会话生命周期 / Session lifecycle
*/

use crate::errors::ReplError;
use tokio::sync::watch;
use tracing::{info, warn};

/// 会话正常结束的原因 / Why a session ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// 输入结束 / Input reached end of stream
    EndOfInput,
    /// 无待续输入时收到中断 / Interrupt with no pending multi-line input
    Interrupted,
}

impl std::fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEnd::EndOfInput => write!(f, "end-of-input"),
            SessionEnd::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// 会话完成信号 / Session completion signal
pub type SessionResult = Result<SessionEnd, ReplError>;

/// 会话状态 / Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未发出提示符 / No prompt emitted yet
    Pending,
    Running,
    /// 正常结束 / Ended normally
    Ended(SessionEnd),
    /// 因传输错误结束 / Ended by a transport (or wiring) failure
    Failed(String),
}

impl SessionState {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended(_) | Self::Failed(_))
    }
}

/// 生命周期跟踪 / Tracks the session state, ending exactly once
#[derive(Debug)]
pub struct Lifecycle {
    state: watch::Sender<SessionState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Pending);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// 首次提示时进入运行状态 / Enter `Running` on the first prompt
    pub fn start(&self) {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Pending {
                info!("REPL session running");
                *state = SessionState::Running;
                true
            } else {
                false
            }
        });
    }

    /// 记录终止状态；重复调用被忽略 / Record the terminal state, later calls are ignored
    pub fn finish(&self, result: &SessionResult) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_ended() {
                warn!(?state, "session already ended, ignoring second completion");
                return false;
            }
            *state = match result {
                Ok(end) => {
                    info!(%end, "REPL session ended");
                    SessionState::Ended(*end)
                }
                Err(err) => {
                    warn!(error = %err, "REPL session failed");
                    SessionState::Failed(err.to_string())
                }
            };
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let lifecycle = Lifecycle::new();
        let watcher = lifecycle.subscribe();
        assert_eq!(lifecycle.state(), SessionState::Pending);

        lifecycle.start();
        lifecycle.start();
        assert_eq!(*watcher.borrow(), SessionState::Running);

        assert!(lifecycle.finish(&Ok(SessionEnd::EndOfInput)));
        assert_eq!(
            lifecycle.state(),
            SessionState::Ended(SessionEnd::EndOfInput)
        );
    }

    #[test]
    fn test_lifecycle_ends_exactly_once() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.finish(&Err(ReplError::Transport(std::io::Error::other(
            "broken pipe"
        )))));
        assert!(!lifecycle.finish(&Ok(SessionEnd::EndOfInput)));
        assert!(matches!(lifecycle.state(), SessionState::Failed(msg) if msg.contains("broken pipe")));

        // 结束后不能再进入运行 / cannot go back to running
        lifecycle.start();
        assert!(lifecycle.state().is_ended());
    }

    #[test]
    fn test_session_end_display() {
        assert_eq!(SessionEnd::EndOfInput.to_string(), "end-of-input");
        assert_eq!(SessionEnd::Interrupted.to_string(), "interrupted");
    }
}
