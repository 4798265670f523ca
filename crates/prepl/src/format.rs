/*!
* 文件名: format.rs
* 作者: JQQ
* 创建日期: 2026/10/13
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: console, serde_json, async-trait
* 描述: 结果格式化与终端样式 / Result formatting and terminal styling
*/

use crate::errors::ReplResult;
use async_trait::async_trait;
use console::style;
use serde_json::Value;
use std::sync::Arc;

/// 结果格式化函数 / Converts a result value to display text
pub type ResultFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// 打印前的异步结果变换 / Async transform applied to every result before printing.
///
/// Returning `Ok(None)` suppresses the output for that value.
#[async_trait]
pub trait ResultTransform: Send + Sync {
    async fn transform(&self, value: Value) -> ReplResult<Option<Value>>;
}

/// 默认格式化器 / Default formatter, coloured when `colors` is set
pub fn default_formatter(colors: bool) -> ResultFormatter {
    Arc::new(move |value: &Value| inspect(value, colors))
}

/// 以检视风格渲染值 / Render a value for display.
///
/// Objects print as `{ key: value }` with bare keys where the key is a plain
/// identifier, arrays as `[ 1, 2 ]`, strings JSON-quoted.
pub fn inspect(value: &Value, colors: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, colors);
    out
}

fn write_value(out: &mut String, value: &Value, colors: bool) {
    match value {
        Value::Null => out.push_str(&paint("null", colors, |s| style(s).dim())),
        Value::Bool(b) => out.push_str(&paint(&b.to_string(), colors, |s| style(s).magenta())),
        Value::Number(n) => out.push_str(&paint(&n.to_string(), colors, |s| style(s).yellow())),
        Value::String(s) => out.push_str(&paint(&quote(s), colors, |s| style(s).green())),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, colors);
            }
            out.push_str(" ]");
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    out.push_str(&quote(key));
                }
                out.push_str(": ");
                write_value(out, item, colors);
            }
            out.push_str(" }");
        }
    }
}

fn paint<F>(text: &str, colors: bool, styler: F) -> String
where
    F: FnOnce(String) -> console::StyledObject<String>,
{
    if colors {
        styler(text.to_string()).force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// 提示符样式：粗体蓝色 / Prompt styling, bold blue on terminals
pub(crate) fn style_prompt(prompt: &str, styled: bool) -> String {
    paint(prompt, styled, |s| style(s).bold().blue())
}

/// 错误样式：粗体红色 / Error styling, bold red on terminals
pub(crate) fn style_error(message: &str, styled: bool) -> String {
    paint(message, styled, |s| style(s).bold().red())
}
