/*!
* 文件名: utils.rs
* 作者: JQQ
* 创建日期: 2026/10/15
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: serde_json
* 描述: CLI工具函数 / CLI utility functions
*/

use crate::errors::{CliError, CliResult};
use serde_json::{Map, Value};

/// 解析绑定集合，格式为JSON对象或 "k1:v1,k2:v2"
/// Parse a binding set given as a JSON object or as "k1:v1,k2:v2"
pub fn parse_bindings(text: &str) -> CliResult<Map<String, Value>> {
    let mut map = Map::new();

    if text.trim().is_empty() {
        return Ok(map);
    }

    // 尝试解析为 JSON
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        return Ok(obj);
    }

    // 解析为键值对格式
    for pair in text.split(',') {
        let pair = pair.trim();
        let Some((key, value)) = pair.split_once(':') else {
            return Err(CliError::InvalidBinding(format!(
                "invalid key-value pair: {}",
                pair
            )));
        };
        map.insert(checked_name(key)?, parse_value(value.trim()));
    }

    Ok(map)
}

/// 解析单个 `name=json` 绑定 / Parse one `name=json` binding
pub fn parse_binding(text: &str) -> CliResult<(String, Value)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| CliError::InvalidBinding(format!("expected name=value, got {}", text)))?;
    Ok((checked_name(name)?, parse_value(value.trim())))
}

/// JSON值，解析失败时作为字符串 / JSON value, or the raw text as a string
fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn checked_name(name: &str) -> CliResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidBinding("binding name is empty".to_string()));
    }
    Ok(name.to_string())
}
