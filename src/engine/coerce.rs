use crate::models::{Subwork, UnitInputs};

/// 缺失或非数值金额按 0 处理
pub fn number_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// 子工程声明的单位: 能解析为非零有限数值时取该值, 否则为 1
///
/// 按 Rust 浮点语法解析 (去除首尾空白); "inf"/"NaN" 等非有限值和 0 一律视为 1,
/// "1e3" 这类科学计数法照常接受。
pub fn declared_unit(unit: Option<&str>) -> f64 {
    unit.and_then(|u| u.trim().parse::<f64>().ok())
        .filter(|u| u.is_finite() && *u != 0.0)
        .unwrap_or(1.0)
}

/// 计算用单位倍数: 优先用户输入, 其次子工程声明
pub fn resolve_unit(subwork: &Subwork, unit_inputs: &UnitInputs) -> f64 {
    match unit_inputs.get(&subwork.id) {
        Some(value) => number_or_zero(Some(*value)),
        None => declared_unit(subwork.unit.as_deref()),
    }
}
