//! # XRDML 扫描文件解析器
//!
//! 解析衍射仪导出的 XML 格式倒空间图。只按本地标签名匹配，
//! 与具体的命名空间版本无关。
//!
//! ## 读取的内容
//! ```text
//! xrdMeasurement
//!   usedWavelength intended="K-Alpha 1"
//!     kAlpha1 ...
//!   scan (重复)
//!     dataPoints
//!       positions axis="2Theta": startPosition / endPosition
//!       positions axis="Omega":  commonPosition
//!       counts (或 intensities): 空格分隔的一行强度
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/scan.rs`
//! - 使用 `roxmltree` 读取 XML

use crate::error::{Result, RsmError};
use crate::models::{Grid2, ScanData};
use crate::rsm::constants::lookup_wavelength;

use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

const FORMAT: &str = "XRDML";

/// 解析扫描文件
pub fn parse_xrdml_file(path: &Path) -> Result<ScanData> {
    let content = fs::read_to_string(path).map_err(|e| RsmError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xrdml_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
    .map_err(|e| match e {
        RsmError::ParseError { format, reason, .. } => RsmError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

fn parse_error(name: &str, reason: impl Into<String>) -> RsmError {
    RsmError::ParseError {
        format: FORMAT.to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

/// 从字符串内容解析
pub fn parse_xrdml_content(content: &str, name: &str) -> Result<ScanData> {
    let doc = Document::parse(content).map_err(|e| parse_error(name, e.to_string()))?;
    let root = doc.root_element();

    let wavelength = read_wavelength(root, name)?;

    let mut two_theta_ranges = Vec::new();
    let mut omega = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (index, data_points) in root
        .descendants()
        .filter(|n| is_tag(n, "dataPoints"))
        .enumerate()
    {
        let mut two_theta = None;
        let mut omega_value = None;
        let mut counts = None;

        for child in data_points.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "positions" => match child.attribute("axis") {
                    Some("2Theta") => two_theta = Some(read_range(child, name)?),
                    Some("Omega") => omega_value = Some(read_omega(child, name)?),
                    _ => {}
                },
                "counts" | "intensities" => {
                    counts = Some(parse_numbers(child.text().unwrap_or(""), name)?)
                }
                _ => {}
            }
        }

        let row = index + 1;
        let two_theta = two_theta
            .ok_or_else(|| parse_error(name, format!("scan {}: missing 2Theta positions", row)))?;
        let omega_value = omega_value
            .ok_or_else(|| parse_error(name, format!("scan {}: missing Omega position", row)))?;
        let counts =
            counts.ok_or_else(|| parse_error(name, format!("scan {}: missing counts", row)))?;

        two_theta_ranges.push(two_theta);
        omega.push(omega_value);
        rows.push(counts);
    }

    if rows.is_empty() {
        return Err(parse_error(name, "no dataPoints found"));
    }

    let intensity = Grid2::from_rows(rows)
        .map_err(|_| parse_error(name, "counts rows have different lengths"))?;

    let scan = ScanData {
        name: name.to_string(),
        wavelength,
        two_theta_ranges,
        omega,
        intensity,
    };
    scan.validate()
        .map_err(|e| parse_error(name, e.to_string()))?;

    Ok(scan)
}

fn is_tag(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| is_tag(n, tag))
        .and_then(|n| n.text())
        .map(str::trim)
}

fn parse_number(text: &str, name: &str) -> Result<f64> {
    text.trim()
        .parse()
        .map_err(|_| parse_error(name, format!("invalid number '{}'", text.trim())))
}

fn parse_numbers(text: &str, name: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|s| parse_number(s, name))
        .collect()
}

/// 波长：先按 intended 名称查表，否则取 kAlpha1 的值
fn read_wavelength(root: Node, name: &str) -> Result<f64> {
    let used = root
        .descendants()
        .find(|n| is_tag(n, "usedWavelength"))
        .ok_or_else(|| parse_error(name, "missing usedWavelength"))?;

    if let Some(value) = used.attribute("intended").and_then(lookup_wavelength) {
        return Ok(value);
    }

    match child_text(used, "kAlpha1") {
        Some(text) => parse_number(text, name),
        None => Err(parse_error(
            name,
            format!(
                "unknown wavelength '{}' and no kAlpha1 value",
                used.attribute("intended").unwrap_or("")
            ),
        )),
    }
}

/// 2θ 起止角；只有 commonPosition 时起止相同
fn read_range(positions: Node, name: &str) -> Result<(f64, f64)> {
    match (
        child_text(positions, "startPosition"),
        child_text(positions, "endPosition"),
    ) {
        (Some(start), Some(end)) => Ok((parse_number(start, name)?, parse_number(end, name)?)),
        _ => match child_text(positions, "commonPosition") {
            Some(common) => {
                let v = parse_number(common, name)?;
                Ok((v, v))
            }
            None => Err(parse_error(name, "2Theta positions without start/end")),
        },
    }
}

fn read_omega(positions: Node, name: &str) -> Result<f64> {
    child_text(positions, "commonPosition")
        .or_else(|| child_text(positions, "startPosition"))
        .ok_or_else(|| parse_error(name, "Omega positions without commonPosition"))
        .and_then(|text| parse_number(text, name))
}
