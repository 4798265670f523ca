/*!
* 文件名: context.rs
* 作者: JQQ
* 创建日期: 2026/10/12
* 最后修改日期: 2026/10/13
* 版权: 2023 JQQ. All rights reserved.
* 依赖: serde_json, tokio
* 描述: 会话执行上下文 / Session execution context
*/

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 会话共享的上下文句柄 / Context handle shared between the driver and the embedder
pub type SharedContext = Arc<Mutex<ExecutionContext>>;

/// 固定的种子绑定名 / Names of the fixed seed bindings
pub const SEED_BINDINGS: &[&str] = &["process", "prepl"];

/// 执行上下文：名称到值的可变命名空间 / Mutable name -> value namespace
///
/// Every evaluation in a session reads and writes the same context. The driver
/// runs one iteration at a time, so the only concurrent access is an embedder
/// injecting bindings between iterations through [`SharedContext`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    bindings: Map<String, Value>,
}

impl ExecutionContext {
    /// 空上下文 / Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// 带宿主种子绑定的上下文 / Context holding the host seed bindings
    pub fn seeded() -> Self {
        let mut context = Self::new();
        context.set(
            "process",
            json!({
                "pid": std::process::id(),
                "platform": std::env::consts::OS,
                "arch": std::env::consts::ARCH,
            }),
        );
        context.set("prepl", json!({ "version": crate::VERSION }));
        context
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// 设置绑定，返回旧值 / Bind `name`, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.bindings.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// 合并调用方提供的绑定（覆盖同名）/ Merge caller bindings, later ones win
    pub fn extend(&mut self, bindings: Map<String, Value>) {
        self.bindings.extend(bindings);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.bindings
    }

    pub fn into_shared(self) -> SharedContext {
        Arc::new(Mutex::new(self))
    }
}
