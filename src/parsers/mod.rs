//! # 解析器模块
//!
//! 读取衍射仪导出的倒空间图扫描文件。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/scan.rs` 数据模型
//! - 子模块: xrdml

pub mod xrdml;

use crate::error::{Result, RsmError};
use crate::models::ScanData;
use std::path::Path;

/// 支持的扫描文件扩展名
pub const SCAN_EXTENSIONS: &[&str] = &["xrdml", "xml"];

/// 是否为可识别的扫描文件
pub fn is_scan_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SCAN_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// 从文件路径推断格式并解析
pub fn parse_scan_file(path: &Path) -> Result<ScanData> {
    if !path.exists() {
        return Err(RsmError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    if is_scan_file(path) {
        xrdml::parse_xrdml_file(path)
    } else {
        Err(RsmError::UnsupportedFormat(format!(
            "Cannot determine scan format for: {} (expected .xrdml or .xml)",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_scan_file() {
        assert!(is_scan_file(Path::new("data/sample.xrdml")));
        assert!(is_scan_file(Path::new("sample.XML")));
        assert!(!is_scan_file(Path::new("sample.csv")));
        assert!(!is_scan_file(Path::new("README")));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_scan_file(Path::new("/nonexistent/scan.xrdml")),
            Err(RsmError::FileNotFound { .. })
        ));
    }
}
