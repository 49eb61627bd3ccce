// ==========================================
// 城市垃圾收运调度 - JSON 载荷适配
// ==========================================
// 接受:
// - 对象数组 [ {...}, {...} ]
// - 包装对象 { "data": [ ... ] } / { "bins": [ ... ] }
// - 单个对象 { ... }
// 标量值转为字符串, null 视为缺失
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use serde_json::Value;

/// 包装对象中可能承载记录数组的键
const WRAPPER_KEYS: [&str; 3] = ["data", "bins", "records"];

/// JSON 载荷转为原始行
pub fn rows_from_json(value: &Value) -> ImportResult<Vec<RawRow>> {
    match value {
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| row_from_object(v, i)).collect(),
        Value::Object(map) => {
            for key in WRAPPER_KEYS {
                if let Some(inner @ Value::Array(_)) = map.get(key) {
                    return rows_from_json(inner);
                }
            }
            Ok(vec![row_from_object(value, 0)?])
        }
        other => Err(ImportError::JsonParseError(format!(
            "顶层必须是对象或数组, 实际为 {}",
            type_name(other)
        ))),
    }
}

fn row_from_object(value: &Value, index: usize) -> ImportResult<RawRow> {
    let Value::Object(map) = value else {
        return Err(ImportError::JsonParseError(format!(
            "第 {} 条记录不是对象 ({})",
            index + 1,
            type_name(value)
        )));
    };

    let mut row = RawRow::new();
    for (key, v) in map {
        let text = match v {
            Value::Null => continue,
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            // 嵌套坐标 {"lat": .., "lon": ..} 展开为同名列
            Value::Object(inner) => {
                for (ik, iv) in inner {
                    if let Some(n) = iv.as_f64() {
                        row.insert(ik.clone(), n.to_string());
                    }
                }
                continue;
            }
            Value::Array(_) => continue,
        };
        row.insert(key.clone(), text);
    }
    Ok(row)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
