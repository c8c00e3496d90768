//! # 扫描数据模型
//!
//! 存储从仪器文件读出的倒易空间图 (RSM) 原始数据：
//! 波长、每行的 2θ 范围、每行的 ω 值以及强度矩阵。
//!
//! ## 依赖关系
//! - 被 `parsers/xrdml.rs` 创建
//! - 被 `rsm/` 和 `commands/` 使用

use crate::error::{Result, RsmError};
use crate::rsm::reciprocal::linspace;

/// 行优先存储的二维网格
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2<T = f64> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid2<T> {
    /// 从行优先数据创建网格
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(RsmError::InvalidArgument(format!(
                "Grid data length {} does not match shape {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// 所有元素相同的网格
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// 从行向量创建网格，要求每行等长
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(RsmError::InvalidArgument(format!(
                "Row {} has {} columns, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// 逐元素映射
    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Grid2<U> {
        Grid2 {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// 按 (行, 列, 值) 遍历
    pub fn indexed_iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i / cols, i % cols, v))
    }
}

impl Grid2<f64> {
    /// 最大值（忽略 NaN）
    pub fn max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// 最小值（忽略 NaN）
    pub fn min(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }
}

/// 一次 RSM 测量
#[derive(Debug, Clone)]
pub struct ScanData {
    /// 扫描名称（通常为文件名）
    pub name: String,
    /// X 射线波长（Å）
    pub wavelength: f64,
    /// 每行的 2θ 起止角（度）
    pub two_theta_ranges: Vec<(f64, f64)>,
    /// 每行的 ω 角（度）
    pub omega: Vec<f64>,
    /// 强度 (rows × columns)
    pub intensity: Grid2,
}

impl ScanData {
    /// 检查行数和形状一致性
    pub fn validate(&self) -> Result<()> {
        let rows = self.intensity.rows();
        if self.two_theta_ranges.len() != rows || self.omega.len() != rows {
            return Err(RsmError::InvalidArgument(format!(
                "Scan '{}': {} 2θ ranges, {} ω values and {} intensity rows",
                self.name,
                self.two_theta_ranges.len(),
                self.omega.len(),
                rows
            )));
        }
        if rows == 0 || self.intensity.cols() == 0 {
            return Err(RsmError::InvalidArgument(format!(
                "Scan '{}' contains no data points",
                self.name
            )));
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.intensity.rows()
    }

    pub fn columns(&self) -> usize {
        self.intensity.cols()
    }

    /// 实空间 2θ 网格：每行在 [start, end] 上等距取样
    pub fn two_theta_grid(&self) -> Grid2 {
        let cols = self.columns();
        let data = self
            .two_theta_ranges
            .iter()
            .flat_map(|&(start, end)| linspace(start, end, cols))
            .collect();
        Grid2 {
            rows: self.two_theta_ranges.len(),
            cols,
            data,
        }
    }

    /// 实空间 ω 网格：每行的 ω 值广播到所有列
    pub fn omega_grid(&self) -> Grid2 {
        let cols = self.columns();
        let data = self
            .omega
            .iter()
            .flat_map(|&w| std::iter::repeat(w).take(cols))
            .collect();
        Grid2 {
            rows: self.omega.len(),
            cols,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scan() -> ScanData {
        ScanData {
            name: "sample".to_string(),
            wavelength: 1.540598,
            two_theta_ranges: vec![(20.0, 30.0), (21.0, 31.0)],
            omega: vec![10.0, 10.5],
            intensity: Grid2::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap(),
        }
    }

    #[test]
    fn test_grid_from_rows_rejects_ragged() {
        let result = Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_grid_access() {
        let g = Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(g.shape(), (2, 2));
        assert_eq!(*g.get(1, 0), 3.0);
        assert_eq!(g.row(1), &[3.0, 4.0]);
        assert_eq!(g.max(), Some(4.0));
        assert_eq!(g.min(), Some(1.0));
    }

    #[test]
    fn test_scan_grids() {
        let scan = sample_scan();
        scan.validate().unwrap();

        let tt = scan.two_theta_grid();
        assert_eq!(tt.shape(), (2, 3));
        assert_eq!(tt.row(0), &[20.0, 25.0, 30.0]);
        assert_eq!(tt.row(1), &[21.0, 26.0, 31.0]);

        let om = scan.omega_grid();
        assert_eq!(om.row(1), &[10.5, 10.5, 10.5]);
    }

    #[test]
    fn test_scan_validate_row_mismatch() {
        let mut scan = sample_scan();
        scan.omega.pop();
        assert!(scan.validate().is_err());
    }
}
