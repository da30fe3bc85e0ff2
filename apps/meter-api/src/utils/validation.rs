//! 输入验证辅助函数
//!
//! - normalize_required：验证必填字段，去除空格并检查非空
//! - normalize_optional：验证可选字段，空字符串视为未提供
//! - require_values：验证必填数组字段
//!
//! 失败返回 bad_request_error 响应。

use crate::utils::response::bad_request_error;
use axum::response::Response;

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: Option<String>, message: &str) -> Result<String, Response> {
    match normalize_optional(value) {
        Some(value) => Ok(value),
        None => Err(bad_request_error(message)),
    }
}

/// 验证可选字段：去除空格，空字符串视为未提供
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 验证必填数组字段
pub fn require_values(value: Option<Vec<f64>>, field: &str) -> Result<Vec<f64>, Response> {
    value.ok_or_else(|| bad_request_error(format!("{field} array required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn blank_value_is_missing() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" 001 ".to_string())),
            Some("001".to_string())
        );
    }

    #[test]
    fn required_value_rejects_blank() {
        let response = normalize_required(Some(String::new()), "Missing device parameter")
            .expect_err("blank");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
