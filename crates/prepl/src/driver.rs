/*!
* 文件名: driver.rs
* 作者: JQQ
* 创建日期: 2026/10/13
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, serde_json, tracing
* 描述: 读取-求值-打印驱动器 / Read-eval-print driver
*/

//! One iteration is: prompt, read, echo, compile + execute, print. Iterations run
//! strictly one after another on a single task; between two iterations the driver
//! yields to the scheduler once.
//!
//! Multi-line input: a compile attempt classified as incomplete is kept in the
//! accumulation buffer and prefixed to the next line; the continuation prompt is
//! shown while the buffer is non-empty.

use crate::config::{BoxedWriter, InputSource, OutputSink, ReplOptions};
use crate::context::{ExecutionContext, SharedContext};
use crate::errors::{ReplError, ReplResult};
use crate::evaluator::{Binding, Compilation, Evaluator, Execution};
use crate::format::{self, ResultFormatter, ResultTransform};
use crate::interrupt::{InterruptHandle, InterruptWatch};
use crate::lifecycle::{Lifecycle, SessionEnd, SessionResult, SessionState};
use crate::line_reader::{LineReader, INTERRUPT_LINE};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::{debug, info};

/// 输出流包装 / Output stream wrapper
struct Sink {
    writer: BoxedWriter,
    /// 调用方提供的流在结束时关闭 / Caller streams are shut down at the end
    owned: bool,
}

impl Sink {
    fn new(sink: OutputSink) -> Self {
        let owned = !sink.is_default();
        let writer: BoxedWriter = match sink {
            OutputSink::Stdout => Box::new(tokio::io::stdout()),
            OutputSink::Stderr => Box::new(tokio::io::stderr()),
            OutputSink::Stream(writer) => writer,
        };
        Self { writer, owned }
    }

    async fn write(&mut self, text: &str) -> ReplResult<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> ReplResult<()> {
        if self.owned {
            self.writer.shutdown().await?;
        } else {
            self.writer.flush().await?;
        }
        Ok(())
    }
}

/// REPL会话 / A REPL session driving one evaluator over one input
pub struct Session<E: Evaluator> {
    evaluator: E,
    reader: LineReader,
    input: Option<InputSource>,
    output: Sink,
    errors: Sink,
    prompt: String,
    continuation_prompt: String,
    /// 非交互时回显输入 / Echo input unless both ends are terminals
    echo: bool,
    styled: bool,
    errors_styled: bool,
    formatter: ResultFormatter,
    transform: Option<Arc<dyn ResultTransform>>,
    context: SharedContext,
    /// 多行累积缓冲 / Accumulated incomplete input
    accumulated: String,
    interrupt: InterruptHandle,
    interrupts: InterruptWatch,
    lifecycle: Lifecycle,
}

impl<E: Evaluator> Session<E> {
    /// 创建会话 / Create a session; nothing is read until [`run`](Self::run)
    pub fn new(options: ReplOptions, evaluator: E) -> ReplResult<Self> {
        options.validate()?;

        let input_tty = options.input_is_terminal();
        let output_tty = options.output_is_terminal();
        let styled = options
            .colors
            .unwrap_or_else(|| output_tty && console::colors_enabled());
        let errors_styled = options
            .colors
            .unwrap_or_else(|| options.errors.is_terminal() && console::colors_enabled_stderr());

        let formatter = options
            .formatter
            .unwrap_or_else(|| format::default_formatter(styled));

        let mut context = ExecutionContext::seeded();
        context.extend(options.initial_bindings);

        let reader = LineReader::new();
        let (interrupt, interrupts) = InterruptHandle::new(reader.signal());

        debug!(
            echo = !(input_tty && output_tty),
            styled,
            bindings = context.len(),
            "REPL session created"
        );

        Ok(Self {
            evaluator,
            reader,
            input: Some(options.input),
            output: Sink::new(options.output),
            errors: Sink::new(options.errors),
            prompt: options.prompt,
            continuation_prompt: options.continuation_prompt,
            echo: !(input_tty && output_tty),
            styled,
            errors_styled,
            formatter,
            transform: options.transform,
            context: context.into_shared(),
            accumulated: String::new(),
            interrupt,
            interrupts,
            lifecycle: Lifecycle::new(),
        })
    }

    /// 共享执行上下文 / The session's shared execution context
    pub fn context(&self) -> SharedContext {
        self.context.clone()
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.lifecycle.subscribe()
    }

    /// 运行会话直至结束 / Run until input ends, an interrupt ends it, or I/O fails
    pub async fn run(mut self) -> SessionResult {
        let result = self.drive().await;

        let closed = self.close().await;
        let result = match (result, closed) {
            (Ok(_), Err(err)) => Err(err),
            (result, _) => result,
        };

        self.lifecycle.finish(&result);
        result
    }

    async fn drive(&mut self) -> SessionResult {
        self.attach_input().await?;

        loop {
            if self.reader.is_done() {
                info!("input exhausted");
                return Ok(SessionEnd::EndOfInput);
            }

            match self.iterate().await {
                Ok(Some(end)) => return Ok(end),
                Ok(None) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => self.report(&err).await?,
            }

            tokio::task::yield_now().await;
        }
    }

    async fn attach_input(&mut self) -> ReplResult<()> {
        match self.input.take() {
            Some(InputSource::Stdin) => self.reader.attach(tokio::io::stdin()),
            Some(InputSource::Stream(stream)) => self.reader.attach(stream),
            Some(InputSource::File(path)) => self.reader.load_path(path).await?,
            Some(InputSource::Text(text)) => {
                self.reader.feed(text.as_bytes());
                self.reader.finish();
            }
            None => {}
        }
        Ok(())
    }

    /// 单次迭代 / One prompt-read-eval-print iteration.
    ///
    /// Returns `Some` when the iteration ends the session.
    async fn iterate(&mut self) -> ReplResult<Option<SessionEnd>> {
        let line = if self.echo {
            // transcripts: prompt only once a line exists, so closed input leaves no dangling prompt
            let Some(line) = self.reader.read_line().await? else {
                return Ok(None);
            };
            // 中断标记不是输入行，不配提示符 / the interrupt marker gets no prompt
            if line != INTERRUPT_LINE {
                self.emit_prompt().await?;
            }
            line
        } else {
            self.emit_prompt().await?;
            match self.reader.read_line().await? {
                Some(line) => line,
                None => return Ok(None),
            }
        };

        if line == INTERRUPT_LINE {
            return self.on_interrupt().await;
        }

        if self.echo {
            self.output.write(&line).await?;
        }

        if let Some(value) = self.evaluate(&line).await? {
            self.print(value).await?;
        }
        Ok(None)
    }

    async fn emit_prompt(&mut self) -> ReplResult<()> {
        self.lifecycle.start();
        let prompt = if self.accumulated.is_empty() {
            &self.prompt
        } else {
            &self.continuation_prompt
        };
        let text = format::style_prompt(prompt, self.styled);
        self.output.write(&text).await
    }

    async fn on_interrupt(&mut self) -> ReplResult<Option<SessionEnd>> {
        self.output.write("\n").await?;
        if self.accumulated.is_empty() {
            info!("interrupt with no pending input");
            return Ok(Some(SessionEnd::Interrupted));
        }
        debug!(
            discarded = self.accumulated.len(),
            "interrupt cleared pending input"
        );
        self.accumulated.clear();
        Ok(None)
    }

    /// 累积策略 + 编译执行 / Accumulation policy, then compile and execute
    async fn evaluate(&mut self, line: &str) -> ReplResult<Option<Value>> {
        let mut source = std::mem::take(&mut self.accumulated);
        source.push_str(line);

        match self.evaluator.compile(&source) {
            Compilation::Incomplete => {
                debug!(bytes = source.len(), "incomplete input, accumulating");
                self.accumulated = source;
                Ok(None)
            }
            Compilation::Fatal(err) => Err(err),
            Compilation::Ready { unit, binding } => {
                let execution = {
                    let mut context = self.context.lock().await;
                    self.evaluator.execute(unit, &mut context)
                };
                let value = self.settle(execution).await?;
                self.bind(binding, value).await
            }
        }
    }

    async fn settle(&mut self, execution: Execution) -> ReplResult<Option<Value>> {
        match execution {
            Execution::Immediate(value) => Ok(value),
            Execution::Failed(err) => Err(err),
            Execution::Pending(pending) => {
                self.interrupts.arm();
                tokio::select! {
                    settled = pending => settled,
                    _ = self.interrupts.triggered() => {
                        // the marker line is still queued and is handled by the next read
                        debug!("pending evaluation abandoned by interrupt");
                        Err(ReplError::Interrupted)
                    }
                }
            }
        }
    }

    async fn bind(
        &mut self,
        binding: Option<Binding>,
        value: Option<Value>,
    ) -> ReplResult<Option<Value>> {
        let Some(binding) = binding else {
            return Ok(value);
        };

        let value = value.unwrap_or(Value::Null);
        debug!(name = %binding.name, silent = binding.silent, "binding settled value");
        self.context
            .lock()
            .await
            .set(binding.name, value.clone());

        Ok(if binding.silent { None } else { Some(value) })
    }

    async fn print(&mut self, value: Value) -> ReplResult<()> {
        let value = match &self.transform {
            Some(transform) => transform.transform(value).await?,
            None => Some(value),
        };
        let Some(value) = value else {
            return Ok(());
        };

        let mut text = (self.formatter)(&value);
        text.push('\n');
        self.output.write(&text).await
    }

    async fn report(&mut self, err: &ReplError) -> ReplResult<()> {
        debug!(error = %err, "evaluation failed");
        let mut text = format::style_error(&err.to_string(), self.errors_styled);
        text.push('\n');
        self.errors.write(&text).await
    }

    async fn close(&mut self) -> ReplResult<()> {
        let output = self.output.close().await;
        let errors = self.errors.close().await;
        output.and(errors)
    }
}
