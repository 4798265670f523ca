//! Common test utilities for the end-to-end transcript tests

#![allow(dead_code)]

use std::time::Duration;

use promise_repl::prepl_script::ScriptEvaluator;
use promise_repl::{start, InputSource, OutputSink, ReplOptions, SessionResult};
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::time::timeout;

/// Test timeout duration
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between input chunks
pub const CHUNK_GAP: Duration = Duration::from_millis(10);

const PIPE_CAPACITY: usize = 64 * 1024;

/// 一次会话的完整记录 / Everything a finished session produced
#[derive(Debug)]
pub struct Transcript {
    pub result: SessionResult,
    pub output: String,
    pub errors: String,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// 输出与错误通道都接到内存管道 / Options with both sinks on in-memory pipes
pub fn piped_options() -> (ReplOptions, DuplexStream, DuplexStream) {
    let (out_w, out_r) = tokio::io::duplex(PIPE_CAPACITY);
    let (err_w, err_r) = tokio::io::duplex(PIPE_CAPACITY);
    let options = ReplOptions::new()
        .with_output(OutputSink::stream(out_w))
        .with_errors(OutputSink::stream(err_w));
    (options, out_r, err_r)
}

pub async fn read_all(mut pipe: DuplexStream) -> String {
    let mut text = String::new();
    pipe.read_to_string(&mut text).await.unwrap();
    text
}

/// 把输入按块送入会话 / Feed the input as separate chunks, then end it
pub async fn run_chunks(options: ReplOptions, chunks: &[&[u8]]) -> Transcript {
    init_tracing();

    let mut input = tokio_test::io::Builder::new();
    for (i, chunk) in chunks.iter().filter(|chunk| !chunk.is_empty()).enumerate() {
        if i > 0 {
            input.wait(CHUNK_GAP);
        }
        input.read(chunk);
    }
    let options = options.with_input(InputSource::stream(input.build()));

    run(options).await
}

/// 以完整文本运行 / Run over a complete text
pub async fn run_text(options: ReplOptions, text: &str) -> Transcript {
    run_chunks(options, &[text.as_bytes()]).await
}

/// 默认提示符下的单块输入 / Single chunk of input with the default prompt
pub async fn transcript(text: &str) -> Transcript {
    run_text(ReplOptions::new(), text).await
}

async fn run(options: ReplOptions) -> Transcript {
    let (out_w, out_r) = tokio::io::duplex(PIPE_CAPACITY);
    let (err_w, err_r) = tokio::io::duplex(PIPE_CAPACITY);
    let options = options
        .with_output(OutputSink::stream(out_w))
        .with_errors(OutputSink::stream(err_w));

    let server = start(options, ScriptEvaluator::new()).unwrap();
    let result = timeout(TEST_TIMEOUT, server.wait())
        .await
        .expect("session timed out");

    Transcript {
        result,
        output: read_all(out_r).await,
        errors: read_all(err_r).await,
    }
}

/// 精确读取下一段输出 / Read exactly `expected.len()` bytes and compare
pub async fn expect_output(pipe: &mut DuplexStream, expected: &str) {
    let mut buf = vec![0u8; expected.len()];
    timeout(TEST_TIMEOUT, pipe.read_exact(&mut buf))
        .await
        .expect("timed out waiting for output")
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&buf), expected);
}
