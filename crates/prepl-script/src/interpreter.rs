/*!
* 文件名: interpreter.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, serde_json, async-recursion
* 描述: 异步树遍历解释器 / Async tree-walking interpreter
*/

use crate::ast::{BinaryOp, Expr, Statement, UnaryOp, MAX_DEPTH};
use crate::errors::{ScriptError, ScriptResult, TOO_DEEP};
use async_recursion::async_recursion;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::debug;

/// 可精确表示为整数的上界 / Largest magnitude where every integer is exact in an f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// 数值转JSON：整数值输出为整数 / f64 to JSON, integral values become integers
pub(crate) fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 字符串形式：字符串不加引号 / String form, strings are not quoted
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 解释器，持有执行开始时的上下文快照 / Interpreter over a snapshot of the context
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    scope: Map<String, Value>,
}

impl Interpreter {
    pub fn new(scope: Map<String, Value>) -> Self {
        Self { scope }
    }

    /// 执行一个单元；空单元没有结果 / Run one unit, an empty unit has no result
    pub async fn run(&self, statement: &Statement) -> ScriptResult<Option<Value>> {
        match statement {
            Statement::Empty => Ok(None),
            Statement::Expr(expr) => self.eval(expr).await.map(Some),
            Statement::Assign { value, .. } => self.eval(value).await.map(Some),
        }
    }

    /// 求值表达式 / Evaluate an expression.
    ///
    /// Trees built by hand may be deeper than the parser allows; they fail with a
    /// runtime error at [`MAX_DEPTH`] instead of exhausting the stack.
    pub async fn eval(&self, expr: &Expr) -> ScriptResult<Value> {
        self.eval_at(expr, 0).await
    }

    #[async_recursion]
    async fn eval_at(&self, expr: &Expr, depth: usize) -> ScriptResult<Value> {
        if depth > MAX_DEPTH {
            return Err(ScriptError::runtime(TOO_DEEP));
        }
        let depth = depth + 1;

        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self
                .scope
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::runtime(format!("{} is not defined", name))),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_at(item, depth).await?);
                }
                Ok(Value::Array(values))
            }
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, item) in entries {
                    map.insert(key.clone(), self.eval_at(item, depth).await?);
                }
                Ok(Value::Object(map))
            }
            Expr::Member(target, name) => {
                let target = self.eval_at(target, depth).await?;
                member(&target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval_at(target, depth).await?;
                let index = self.eval_at(index, depth).await?;
                index_into(&target, &index)
            }
            Expr::Unary(op, operand) => {
                let value = self.eval_at(operand, depth).await?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
                    UnaryOp::Neg => value.as_f64().map(|n| number(-n)).ok_or_else(|| {
                        ScriptError::runtime(format!("Cannot negate {}", type_name(&value)))
                    }),
                }
            }
            Expr::Binary(BinaryOp::And, left, right) => {
                let left = self.eval_at(left, depth).await?;
                if truthy(&left) {
                    self.eval_at(right, depth).await
                } else {
                    Ok(left)
                }
            }
            Expr::Binary(BinaryOp::Or, left, right) => {
                let left = self.eval_at(left, depth).await?;
                if truthy(&left) {
                    Ok(left)
                } else {
                    self.eval_at(right, depth).await
                }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval_at(left, depth).await?;
                let right = self.eval_at(right, depth).await?;
                apply(*op, &left, &right)
            }
            Expr::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_at(arg, depth).await?);
                }
                call(name, values).await
            }
        }
    }
}

fn member(target: &Value, name: &str) -> ScriptResult<Value> {
    match target {
        Value::Null => Err(ScriptError::runtime(format!(
            "Cannot read properties of null (reading '{}')",
            name
        ))),
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if name == "length" => Ok(Value::from(items.len())),
        Value::String(s) if name == "length" => Ok(Value::from(s.chars().count())),
        _ => Ok(Value::Null),
    }
}

fn index_into(target: &Value, index: &Value) -> ScriptResult<Value> {
    let position = index
        .as_f64()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0)
        .map(|n| n as usize);

    match (target, position) {
        (Value::Null, _) => Err(ScriptError::runtime(format!(
            "Cannot read properties of null (reading '{}')",
            to_text(index)
        ))),
        (Value::Array(items), Some(i)) => Ok(items.get(i).cloned().unwrap_or(Value::Null)),
        (Value::String(s), Some(i)) => Ok(s
            .chars()
            .nth(i)
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        (Value::Object(map), _) => Ok(map.get(&to_text(index)).cloned().unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

fn apply(op: BinaryOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    match op {
        BinaryOp::Add if left.is_string() || right.is_string() => {
            Ok(Value::String(format!("{}{}", to_text(left), to_text(right))))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (a, b) = operands(op, left, right)?;
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            };
            if !result.is_finite() {
                return Err(ScriptError::runtime(format!(
                    "{} {} {} is not a finite number",
                    left,
                    op.symbol(),
                    right
                )));
            }
            Ok(number(result))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (left, right) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => {
                    let (a, b) = operands(op, left, right)?;
                    a.partial_cmp(&b)
                }
            };
            let holds = ordering.is_some_and(|ordering| match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            Ok(Value::Bool(holds))
        }
        BinaryOp::Eq => Ok(Value::Bool(equals(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!equals(left, right))),
        BinaryOp::And => Ok(if truthy(left) { right.clone() } else { left.clone() }),
        BinaryOp::Or => Ok(if truthy(left) { left.clone() } else { right.clone() }),
    }
}

fn operands(op: BinaryOp, left: &Value, right: &Value) -> ScriptResult<(f64, f64)> {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ScriptError::runtime(format!(
            "Cannot apply '{}' to {} and {}",
            op.symbol(),
            type_name(left),
            type_name(right)
        ))),
    }
}

/// 数值按值比较，`1 == 1.0` / Numbers compare by value, so `1 == 1.0`
fn equals(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

/// 内置函数 / Builtin functions
async fn call(name: &str, mut args: Vec<Value>) -> ScriptResult<Value> {
    match name {
        "delay" => {
            if args.is_empty() || args.len() > 2 {
                return Err(arity(name, "1 or 2", args.len()));
            }
            let value = if args.len() == 2 {
                args.remove(1)
            } else {
                Value::Null
            };
            let ms = args[0]
                .as_f64()
                .filter(|ms| *ms >= 0.0 && ms.is_finite())
                .ok_or_else(|| {
                    ScriptError::runtime("delay() expects a non-negative number of milliseconds")
                })?;
            debug!(ms, "delaying result");
            tokio::time::sleep(Duration::from_millis(ms as u64)).await;
            Ok(value)
        }
        "len" => {
            let [value] = single(name, args)?;
            match value {
                Value::String(s) => Ok(Value::from(s.chars().count())),
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::Object(map) => Ok(Value::from(map.len())),
                other => Err(ScriptError::runtime(format!(
                    "len() expects a string, array or object, got {}",
                    type_name(&other)
                ))),
            }
        }
        "keys" => {
            let [value] = single(name, args)?;
            match value {
                Value::Object(map) => Ok(Value::Array(map.into_iter().map(|(k, _)| Value::String(k)).collect())),
                other => Err(ScriptError::runtime(format!(
                    "keys() expects an object, got {}",
                    type_name(&other)
                ))),
            }
        }
        "type" => {
            let [value] = single(name, args)?;
            Ok(Value::String(type_name(&value).to_string()))
        }
        "str" => {
            let [value] = single(name, args)?;
            Ok(Value::String(to_text(&value)))
        }
        _ => Err(ScriptError::runtime(format!("{} is not a function", name))),
    }
}

fn single(name: &str, args: Vec<Value>) -> ScriptResult<[Value; 1]> {
    let count = args.len();
    <[Value; 1]>::try_from(args).map_err(|_| arity(name, "1", count))
}

fn arity(name: &str, expected: &str, got: usize) -> ScriptError {
    ScriptError::runtime(format!(
        "{}() expects {} argument(s), got {}",
        name, expected, got
    ))
}
