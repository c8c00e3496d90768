//! # 二元端点材料数据库
//!
//! 内置 III 族氮化物（纤锌矿）的晶格常数和弹性常数，并支持从 CSV
//! 读取用户自定义材料。
//!
//! ## 数据来源
//! I. Vurgaftman and J. R. Meyer, J. Appl. Phys. 94, 3675 (2003)
//!
//! ## CSV 格式
//! ```text
//! name,a,c,c13,c33
//! GaN,3.189,5.185,106,398
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/solve.rs`, `commands/theory.rs` 调用
//! - 使用 `csv` + `serde` 读取自定义材料

use crate::error::{Result, RsmError};
use crate::models::{BinaryEndpointParameters, TernaryParameters};

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

/// 内置二元材料
pub static BUILTIN_BINARIES: LazyLock<HashMap<&'static str, BinaryEndpointParameters>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // 氮化镓
        m.insert(
            "GaN",
            BinaryEndpointParameters::new(3.189, 5.185, 106.0, 398.0),
        );

        // 氮化铝
        m.insert(
            "AlN",
            BinaryEndpointParameters::new(3.112, 4.982, 108.0, 373.0),
        );

        // 氮化铟
        m.insert(
            "InN",
            BinaryEndpointParameters::new(3.545, 5.703, 92.0, 224.0),
        );

        m
    });

/// 常用三元合金：(名称, 端点 A, 端点 B)，组分 t 为端点 A 的含量
pub const ALLOY_PRESETS: &[(&str, &str, &str)] = &[
    ("AlGaN", "AlN", "GaN"),
    ("InGaN", "InN", "GaN"),
    ("InAlN", "InN", "AlN"),
];

/// CSV 中的一行
#[derive(Debug, Deserialize)]
struct MaterialRecord {
    name: String,
    a: f64,
    c: f64,
    c13: f64,
    c33: f64,
}

/// 材料表：内置材料 + 自定义材料（同名时自定义优先）
#[derive(Debug, Clone)]
pub struct MaterialTable {
    entries: HashMap<String, BinaryEndpointParameters>,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MaterialTable {
    /// 只包含内置材料
    pub fn builtin() -> Self {
        let entries = BUILTIN_BINARIES
            .iter()
            .map(|(name, params)| (name.to_lowercase(), *params))
            .collect();
        Self { entries }
    }

    /// 从 CSV 文件追加材料
    pub fn load_csv(mut self, path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| RsmError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        self.extend_from_reader(file)?;
        Ok(self)
    }

    /// 从任意读取器追加材料
    pub fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut count = 0;
        for record in rdr.deserialize() {
            let record: MaterialRecord = record?;
            self.entries.insert(
                record.name.to_lowercase(),
                BinaryEndpointParameters::new(record.a, record.c, record.c13, record.c33),
            );
            count += 1;
        }
        Ok(count)
    }

    /// 按名称查找（不区分大小写）
    pub fn get(&self, name: &str) -> Result<BinaryEndpointParameters> {
        self.entries
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                RsmError::UnknownMaterial(format!(
                    "{} (known materials: {})",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    /// 按合金名称（如 "InGaN"）组装三元参数
    pub fn alloy(&self, alloy_name: &str) -> Result<TernaryParameters> {
        let (_, a, b) = ALLOY_PRESETS
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(alloy_name.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = ALLOY_PRESETS.iter().map(|(n, _, _)| *n).collect();
                RsmError::UnknownMaterial(format!(
                    "{} (known alloys: {})",
                    alloy_name,
                    known.join(", ")
                ))
            })?;
        self.pair(a, b)
    }

    /// 用两个端点名称组装三元参数
    pub fn pair(&self, endpoint_a: &str, endpoint_b: &str) -> Result<TernaryParameters> {
        Ok(TernaryParameters::new(
            self.get(endpoint_a)?,
            self.get(endpoint_b)?,
        ))
    }

    /// 按名称排序的材料列表
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = MaterialTable::builtin();
        let gan = table.get("gan").unwrap();
        assert!((gan.lattice_a - 3.189).abs() < 1e-12);
        assert!((gan.elastic_c33 - 398.0).abs() < 1e-12);
        assert!(matches!(
            table.get("ZnO"),
            Err(RsmError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_alloy_presets() {
        let table = MaterialTable::builtin();
        let ingan = table.alloy("ingan").unwrap();
        assert_eq!(ingan.endpoint_a, table.get("InN").unwrap());
        assert_eq!(ingan.endpoint_b, table.get("GaN").unwrap());
        assert!(table.alloy("GaAsN").is_err());
    }

    #[test]
    fn test_custom_csv_overrides() {
        let csv = "name,a,c,c13,c33\n# comment\nZnO, 3.25, 5.207, 105, 210\nGaN,3.19,5.19,100,400\n";
        let mut table = MaterialTable::builtin();
        let added = table.extend_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(added, 2);

        let zno = table.get("ZnO").unwrap();
        assert!((zno.lattice_c - 5.207).abs() < 1e-12);
        let gan = table.get("GaN").unwrap();
        assert!((gan.elastic_c13 - 100.0).abs() < 1e-12);
        assert!(table.names().contains(&"zno".to_string()));
    }

    #[test]
    fn test_custom_csv_bad_row() {
        let csv = "name,a,c,c13,c33\nBad,x,1,2,3\n";
        let mut table = MaterialTable::builtin();
        assert!(matches!(
            table.extend_from_reader(csv.as_bytes()),
            Err(RsmError::CsvError(_))
        ));
    }
}
