/*!
* 文件名: interrupt.rs
* 作者: JQQ
* 创建日期: 2026/10/13
* 最后修改日期: 2026/10/14
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio
* 描述: 会话级中断令牌 / Per-session interrupt token
*/

use crate::line_reader::LineSignal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// 中断句柄 / Interrupt handle
///
/// Cloneable and bound to exactly one session. Sending an interrupt drops any
/// partially typed input, hands the driver the interrupt marker line and abandons
/// an evaluation the driver is currently awaiting.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    lines: LineSignal,
    generation: Arc<watch::Sender<u64>>,
}

impl InterruptHandle {
    pub(crate) fn new(lines: LineSignal) -> (Self, InterruptWatch) {
        let (tx, rx) = watch::channel(0);
        let handle = Self {
            lines,
            generation: Arc::new(tx),
        };
        (handle, InterruptWatch { rx })
    }

    /// 发送中断 / Deliver an interrupt
    pub fn interrupt(&self) {
        debug!("interrupt received");
        self.lines.interrupt();
        self.generation.send_modify(|generation| *generation += 1);
    }
}

/// 驱动器一侧的中断观察者 / Driver side of the interrupt token
#[derive(Debug)]
pub(crate) struct InterruptWatch {
    rx: watch::Receiver<u64>,
}

impl InterruptWatch {
    /// Forget interrupts delivered before this point.
    pub(crate) fn arm(&mut self) {
        self.rx.borrow_and_update();
    }

    /// 等待下一次中断 / Resolve on the next interrupt after [`arm`](Self::arm)
    pub(crate) async fn triggered(&mut self) {
        if self.rx.changed().await.is_err() {
            // every handle is gone, nothing can interrupt any more
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_reader::LineReader;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupt_reaches_reader_and_watch() {
        let reader = LineReader::new();
        let (handle, mut watch) = InterruptHandle::new(reader.signal());
        watch.arm();

        handle.clone().interrupt();

        tokio::time::timeout(Duration::from_secs(1), watch.triggered())
            .await
            .expect("interrupt should wake the watch");
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_armed_watch_ignores_earlier_interrupts() {
        let reader = LineReader::new();
        let (handle, mut watch) = InterruptHandle::new(reader.signal());

        handle.interrupt();
        watch.arm();

        let woke = tokio::time::timeout(Duration::from_millis(20), watch.triggered()).await;
        assert!(woke.is_err());
    }
}
