/*!
* 文件名: line_reader.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, tokio-util
* 描述: 异步行缓冲读取器 / Asynchronous line-buffering reader
*/

//! The line reader turns an arbitrarily chunked byte stream into logical lines.
//!
//! The contract with the consumer:
//!
//! 1. call [`LineReader::is_done`]; if it returns `true` the consumer must not
//!    read again;
//! 2. otherwise call [`LineReader::read_line`] and await it to completion
//!    before asking again. At most one read may be outstanding.
//!
//! Every delivered line carries its trailing `\n`. A final fragment that was not
//! terminated before end of input gets a separator appended so consumers see one
//! shape for every line. The only line without a separator is the interrupt
//! marker, an empty string.

use crate::errors::{ReplError, ReplResult};
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 行分隔符 / Line separator
pub const LINE_SEPARATOR: u8 = b'\n';

/// 中断标记行 / Line injected by an interrupt
pub const INTERRUPT_LINE: &str = "";

const CHUNK_SIZE: usize = 8 * 1024;

type ReadReply = ReplResult<Option<String>>;

/// 读取器内部状态 / Reader state shared with the pump task
#[derive(Debug, Default)]
pub(crate) struct LineState {
    /// 尚未遇到分隔符的尾部片段 / Tail fragment not yet terminated
    remaining: Vec<u8>,
    /// 已完成但未消费的行 / Completed lines waiting for a consumer
    lines: VecDeque<String>,
    /// 唯一的挂起读取 / The single outstanding read
    pending: Option<oneshot::Sender<ReadReply>>,
    /// 输入已结束 / Input signalled end (or failed)
    done: bool,
    /// 尚未交付的传输错误 / Transport error not yet delivered
    error: Option<io::Error>,
}

enum ReadStart {
    Ready(ReadReply),
    Waiting(oneshot::Receiver<ReadReply>),
}

impl LineState {
    fn is_done(&self) -> bool {
        self.done && self.lines.is_empty() && self.error.is_none()
    }

    fn feed(&mut self, chunk: &[u8]) {
        if self.done {
            warn!(bytes = chunk.len(), "ignoring chunk received after end of input");
            return;
        }

        self.remaining.extend_from_slice(chunk);
        if let Some(last) = self.remaining.iter().rposition(|b| *b == LINE_SEPARATOR) {
            let rest = self.remaining.split_off(last + 1);
            let complete = std::mem::replace(&mut self.remaining, rest);
            for line in complete.split_inclusive(|b| *b == LINE_SEPARATOR) {
                self.lines.push_back(String::from_utf8_lossy(line).into_owned());
            }
        }
        debug!(
            queued = self.lines.len(),
            residue = self.remaining.len(),
            "chunk buffered"
        );

        self.fulfill();
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;

        if !self.remaining.is_empty() {
            let mut tail = std::mem::take(&mut self.remaining);
            tail.push(LINE_SEPARATOR);
            self.lines.push_back(String::from_utf8_lossy(&tail).into_owned());
        }
        debug!(queued = self.lines.len(), "end of input");

        self.fulfill();
    }

    fn fail(&mut self, err: io::Error) {
        if self.done {
            return;
        }
        self.done = true;
        // 断开的流中的半行不可信 / a half line from a broken stream is dropped
        self.remaining.clear();
        self.error = Some(err);

        self.fulfill();
    }

    fn interrupt(&mut self) {
        self.remaining.clear();
        self.lines.clear();
        self.lines.push_back(INTERRUPT_LINE.to_string());

        self.fulfill();
    }

    fn begin_read(&mut self) -> ReplResult<ReadStart> {
        if let Some(sender) = &self.pending {
            if !sender.is_closed() {
                return Err(ReplError::protocol(
                    "read_line called while a previous read is still outstanding",
                ));
            }
            debug!("reclaiming read slot abandoned by a dropped reader");
            self.pending = None;
        }

        if let Some(line) = self.lines.pop_front() {
            return Ok(ReadStart::Ready(Ok(Some(line))));
        }
        if let Some(err) = self.error.take() {
            return Ok(ReadStart::Ready(Err(ReplError::Transport(err))));
        }
        if self.done {
            return Err(ReplError::protocol("read_line called after end of input"));
        }

        let (tx, rx) = oneshot::channel();
        self.pending = Some(tx);
        Ok(ReadStart::Waiting(rx))
    }

    /// 尝试完成挂起的读取 / Resolve the outstanding read if something can answer it
    fn fulfill(&mut self) {
        let Some(sender) = self.pending.take() else {
            return;
        };

        let reply = if let Some(line) = self.lines.pop_front() {
            Ok(Some(line))
        } else if let Some(err) = self.error.take() {
            Err(ReplError::Transport(err))
        } else if self.done {
            Ok(None)
        } else {
            self.pending = Some(sender);
            return;
        };

        if let Err(reply) = sender.send(reply) {
            // the waiting future was dropped; keep what it would have received
            match reply {
                Ok(Some(line)) => self.lines.push_front(line),
                Err(ReplError::Transport(err)) => self.error = Some(err),
                _ => {}
            }
        }
    }
}

fn lock(state: &Mutex<LineState>) -> MutexGuard<'_, LineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 行读取器的共享句柄，供中断使用 / Shared handle on the reader state, used by interrupts
#[derive(Debug, Clone)]
pub(crate) struct LineSignal {
    state: Arc<Mutex<LineState>>,
}

impl LineSignal {
    pub(crate) fn interrupt(&self) {
        lock(&self.state).interrupt();
    }
}

/// 异步行读取器 / Asynchronous line reader
///
/// Either fed by hand through [`feed`](Self::feed) / [`finish`](Self::finish), or
/// bound to an [`AsyncRead`] with [`spawn`](Self::spawn), in which case a pump task
/// forwards chunks until end of stream. Dropping the reader stops the pump.
#[derive(Debug)]
pub struct LineReader {
    state: Arc<Mutex<LineState>>,
    cancel: CancellationToken,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// 创建未绑定输入源的读取器 / Create a reader fed manually
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LineState::default())),
            cancel: CancellationToken::new(),
        }
    }

    /// 绑定输入流并启动泵任务 / Bind an input stream and start pumping it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(input: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let reader = Self::new();
        reader.attach(input);
        reader
    }

    /// 为已有读取器启动泵任务 / Start pumping an input stream into this reader
    pub fn attach<R>(&self, input: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(pump(input, self.state.clone(), self.cancel.clone()));
    }

    /// 从完整文本创建已结束的读取器 / Reader over a complete text, already at end of input
    pub fn from_text(text: &str) -> Self {
        let reader = Self::new();
        reader.feed(text.as_bytes());
        reader.finish();
        reader
    }

    /// 一次性读取整个文件 / Read a whole file up front
    pub async fn from_path(path: impl AsRef<Path>) -> ReplResult<Self> {
        let reader = Self::new();
        reader.load_path(path).await?;
        Ok(reader)
    }

    /// 把整个文件作为全部输入 / Use a whole file as the complete input
    pub async fn load_path(&self, path: impl AsRef<Path>) -> ReplResult<()> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded input file");

        let mut state = lock(&self.state);
        state.feed(&bytes);
        state.finish();
        Ok(())
    }

    /// 追加一个数据块 / Append a chunk of input
    pub fn feed(&self, chunk: &[u8]) {
        lock(&self.state).feed(chunk);
    }

    /// 输入结束 / Signal end of input
    pub fn finish(&self) {
        lock(&self.state).finish();
    }

    /// 输入出错 / Signal a transport failure on the input
    pub fn fail(&self, err: io::Error) {
        lock(&self.state).fail(err);
    }

    /// 中断：丢弃缓冲并注入空行 / Drop buffered input and inject the interrupt marker
    pub fn interrupt(&self) {
        lock(&self.state).interrupt();
    }

    /// 输入已结束且无缓冲行 / End of input seen and every line consumed
    pub fn is_done(&self) -> bool {
        lock(&self.state).is_done()
    }

    /// 已缓冲的完整行数 / Number of completed lines waiting
    pub fn buffered(&self) -> usize {
        lock(&self.state).lines.len()
    }

    /// 读取下一行 / Read the next line.
    ///
    /// Resolves with `Some(line)` or with `None` when input ends while the read is
    /// waiting. Fails with [`ReplError::ProtocolViolation`] when another read is
    /// outstanding or when [`is_done`](Self::is_done) is already true, and with
    /// [`ReplError::Transport`] when the input stream failed.
    pub async fn read_line(&self) -> ReplResult<Option<String>> {
        let start = lock(&self.state).begin_read()?;
        match start {
            ReadStart::Ready(reply) => reply,
            ReadStart::Waiting(rx) => rx
                .await
                .map_err(|_| ReplError::protocol("line reader dropped with a read outstanding"))?,
        }
    }

    pub(crate) fn signal(&self) -> LineSignal {
        LineSignal {
            state: self.state.clone(),
        }
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// 泵任务：把输入流的数据块转交给读取器 / Forward chunks from the input stream
async fn pump<R>(mut input: R, state: Arc<Mutex<LineState>>, cancel: CancellationToken)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("line reader pump cancelled");
                break;
            }
            read = input.read(&mut buf) => match read {
                Ok(0) => {
                    lock(&state).finish();
                    break;
                }
                Ok(n) => lock(&state).feed(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "input stream failed");
                    lock(&state).fail(e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    async fn drain(reader: &LineReader) -> Vec<String> {
        let mut lines = Vec::new();
        while !reader.is_done() {
            match reader.read_line().await.unwrap() {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        lines
    }

    fn split_reference(text: &str) -> Vec<String> {
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        if let Some(last) = lines.last_mut() {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
        lines
    }

    #[tokio::test]
    async fn test_chunk_boundary_independence() {
        let text = "let a = 1\n\n{ x: 'é∑' }\nlast line without separator";
        let expected = split_reference(text);
        let bytes = text.as_bytes();

        // 每个切分点 / every two-chunk split point, including inside multi-byte chars
        for cut in 0..=bytes.len() {
            let reader = LineReader::new();
            reader.feed(&bytes[..cut]);
            reader.feed(&bytes[cut..]);
            reader.finish();
            assert_eq!(drain(&reader).await, expected, "split at byte {}", cut);
        }

        // 逐字节 / one byte at a time
        let reader = LineReader::new();
        for b in bytes {
            reader.feed(std::slice::from_ref(b));
        }
        reader.finish();
        assert_eq!(drain(&reader).await, expected);
    }

    #[tokio::test]
    async fn test_not_done_before_end_signal() {
        let reader = LineReader::new();
        assert!(!reader.is_done());

        reader.feed(b"partial");
        assert!(!reader.is_done());
        assert_eq!(reader.buffered(), 0);

        reader.finish();
        assert!(!reader.is_done());
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("partial\n"));
        assert!(reader.is_done());
    }

    #[tokio::test]
    async fn test_empty_input_is_done_after_end() {
        let reader = LineReader::new();
        assert!(!reader.is_done());
        reader.finish();
        assert!(reader.is_done());
    }

    #[test]
    fn test_second_outstanding_read_is_protocol_violation() {
        let reader = LineReader::new();
        let mut first = task::spawn(reader.read_line());
        assert_pending!(first.poll());

        // buffer state does not matter / 无论缓冲状态如何
        let mut second = task::spawn(reader.read_line());
        let err = assert_ready!(second.poll()).unwrap_err();
        assert!(matches!(err, ReplError::ProtocolViolation(_)));

        reader.feed(b"one\ntwo\n");
        assert!(first.is_woken());
        let line = assert_ready!(first.poll()).unwrap();
        assert_eq!(line.as_deref(), Some("one\n"));
    }

    #[tokio::test]
    async fn test_read_after_done_is_protocol_violation() {
        let reader = LineReader::from_text("only\n");
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("only\n"));
        assert!(reader.is_done());

        let err = reader.read_line().await.unwrap_err();
        assert!(matches!(err, ReplError::ProtocolViolation(_)));
    }

    #[test]
    fn test_pending_read_resolves_with_end_marker() {
        let reader = LineReader::new();
        let mut read = task::spawn(reader.read_line());
        assert_pending!(read.poll());

        reader.finish();
        assert!(read.is_woken());
        assert!(assert_ready!(read.poll()).unwrap().is_none());
        assert!(reader.is_done());
    }

    #[test]
    fn test_pending_read_resolves_with_trailing_fragment() {
        let reader = LineReader::new();
        let mut read = task::spawn(reader.read_line());
        assert_pending!(read.poll());

        reader.feed(b"1 +");
        assert_pending!(read.poll());

        reader.finish();
        let line = assert_ready!(read.poll()).unwrap();
        assert_eq!(line.as_deref(), Some("1 +\n"));
    }

    #[test]
    fn test_interrupt_resolves_pending_read_with_marker() {
        let reader = LineReader::new();
        reader.feed(b"half typed");

        let mut read = task::spawn(reader.read_line());
        assert_pending!(read.poll());

        reader.interrupt();
        let line = assert_ready!(read.poll()).unwrap();
        assert_eq!(line.as_deref(), Some(INTERRUPT_LINE));

        // 残余片段已清除 / residue was discarded
        reader.feed(b"next\n");
        assert_eq!(reader.buffered(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_discards_queued_lines() {
        let reader = LineReader::new();
        reader.feed(b"a\nb\nc");
        reader.interrupt();

        assert_eq!(reader.buffered(), 1);
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_dropped_read_is_reclaimed() {
        let reader = LineReader::new();
        {
            let mut abandoned = task::spawn(reader.read_line());
            assert_pending!(abandoned.poll());
        }

        reader.feed(b"kept\n");
        assert_eq!(reader.buffered(), 1);

        let mut read = task::spawn(reader.read_line());
        let line = assert_ready!(read.poll()).unwrap();
        assert_eq!(line.as_deref(), Some("kept\n"));
    }

    #[tokio::test]
    async fn test_chunks_after_end_are_ignored() {
        let reader = LineReader::new();
        reader.feed(b"a\n");
        reader.finish();
        reader.feed(b"b\n");

        assert_eq!(drain(&reader).await, vec!["a\n".to_string()]);
    }

    #[tokio::test]
    async fn test_spawned_reader_over_chunked_stream() {
        let input = tokio_test::io::Builder::new()
            .read(b"1 + \n")
            .wait(Duration::from_millis(10))
            .read(b"1\nx = ")
            .wait(Duration::from_millis(10))
            .read(b"5")
            .build();

        let reader = LineReader::spawn(input);
        let mut lines = Vec::new();
        while !reader.is_done() {
            if let Some(line) = reader.read_line().await.unwrap() {
                lines.push(line);
            }
        }

        assert_eq!(lines, vec!["1 + \n", "1\n", "x = 5\n"]);
    }

    #[tokio::test]
    async fn test_transport_error_after_buffered_lines() {
        let input = tokio_test::io::Builder::new()
            .read(b"first\nsecond\nhalf")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            .build();

        let reader = LineReader::spawn(input);
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("first\n"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("second\n"));

        let err = reader.read_line().await.unwrap_err();
        assert!(matches!(err, ReplError::Transport(_)));
        assert!(reader.is_done());
    }

    #[tokio::test]
    async fn test_from_path_preloads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "a = 1\na\n").unwrap();

        let reader = LineReader::from_path(&path).await.unwrap();
        assert_eq!(reader.buffered(), 2);
        assert_eq!(drain(&reader).await, vec!["a = 1\n", "a\n"]);
    }

    #[tokio::test]
    async fn test_from_path_missing_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineReader::from_path(dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplError::Transport(_)));
    }
}
