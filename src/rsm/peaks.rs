//! # 倒空间图峰位检测
//!
//! 步骤：
//! 1. 可选的高斯平滑（截断 4σ，边界按半采样对称反射）
//! 2. 可选的强度阈值：平滑后低于阈值的像素置零
//! 3. 8 邻域局部极大值，去掉（腐蚀后的）零背景
//!
//! ## 依赖关系
//! - 被 `commands/peaks.rs`, `commands/solve.rs` 调用
//! - 使用 `models/scan.rs` 的 `Grid2`

use crate::error::{Result, RsmError};
use crate::models::{Grid2, ReciprocalPoint};

use serde::Serialize;

/// 高斯核截断（以 σ 为单位）
const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// 检测到的峰
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedPeak {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    /// 原始（未平滑）强度
    pub z: f64,
}

impl DetectedPeak {
    pub fn position(&self) -> ReciprocalPoint {
        ReciprocalPoint::new(self.x, self.y)
    }
}

/// 检测结果
#[derive(Debug, Clone)]
pub struct PeakSearch {
    /// 平滑后（阈值前）的图像
    pub filtered: Grid2,
    /// 按强度从高到低排列
    pub peaks: Vec<DetectedPeak>,
}

/// 峰位检测器
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakDetector {
    /// 高斯平滑的 σ（像素），None 表示不平滑
    pub sigma: Option<f64>,
    pub threshold: Option<f64>,
}

impl PeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gaussian(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// 返回 (平滑后图像, 峰位掩码)
    pub fn detect(&self, image: &Grid2) -> Result<(Grid2, Grid2<bool>)> {
        let filtered = match self.sigma {
            Some(sigma) if sigma < 0.0 || !sigma.is_finite() => {
                return Err(RsmError::InvalidArgument(format!(
                    "gaussian sigma must be a non-negative number, got {}",
                    sigma
                )));
            }
            Some(sigma) => gaussian_filter(image, sigma),
            None => image.clone(),
        };

        let picked = match self.threshold {
            Some(threshold) => filtered.map(|&v| if v < threshold { 0.0 } else { v }),
            None => filtered.clone(),
        };

        let mask = peak_mask(&picked);
        Ok((filtered, mask))
    }

    /// 在 (x, y) 坐标网格上检测峰位
    pub fn find_peaks(&self, x: &Grid2, y: &Grid2, image: &Grid2) -> Result<PeakSearch> {
        if x.shape() != image.shape() || y.shape() != image.shape() {
            return Err(RsmError::InvalidArgument(format!(
                "coordinate grids {:?}/{:?} do not match intensity grid {:?}",
                x.shape(),
                y.shape(),
                image.shape()
            )));
        }

        let (filtered, mask) = self.detect(image)?;

        let mut peaks: Vec<DetectedPeak> = mask
            .indexed_iter()
            .filter(|(_, _, &is_peak)| is_peak)
            .map(|(row, col, _)| DetectedPeak {
                row,
                col,
                x: *x.get(row, col),
                y: *y.get(row, col),
                z: *image.get(row, col),
            })
            .collect();

        peaks.sort_by(|a, b| b.z.total_cmp(&a.z));

        Ok(PeakSearch { filtered, peaks })
    }
}

/// 局部极大值掩码（去除零背景）
pub fn peak_mask(image: &Grid2) -> Grid2<bool> {
    let (rows, cols) = image.shape();
    let mut mask = Grid2::filled(rows, cols, false);

    for (r, c, &value) in image.indexed_iter() {
        let mut local_max = true;
        let mut eroded_background = value == 0.0;

        // 网格外的邻居视为背景，不参与极大值比较
        for (nr, nc) in neighbourhood(r, c) {
            if let Some((nr, nc)) = in_grid(nr, nc, rows, cols) {
                let neighbour = *image.get(nr, nc);
                if neighbour > value {
                    local_max = false;
                }
                if neighbour != 0.0 {
                    eroded_background = false;
                }
            }
        }

        mask.set(r, c, local_max ^ eroded_background);
    }

    mask
}

fn neighbourhood(r: usize, c: usize) -> impl Iterator<Item = (isize, isize)> {
    let (r, c) = (r as isize, c as isize);
    (-1..=1).flat_map(move |dr| (-1..=1).map(move |dc| (r + dr, c + dc)))
}

fn in_grid(r: isize, c: isize, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if r < 0 || c < 0 || r as usize >= rows || c as usize >= cols {
        None
    } else {
        Some((r as usize, c as usize))
    }
}

/// 二维高斯平滑（两轴分离卷积）
pub fn gaussian_filter(image: &Grid2, sigma: f64) -> Grid2 {
    let (rows, cols) = image.shape();
    if image.is_empty() || sigma <= 1e-15 {
        return image.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let mut buffer = Vec::with_capacity(rows.max(cols));

    // 沿行方向（axis 0）
    let mut pass = image.clone();
    for c in 0..cols {
        buffer.clear();
        buffer.extend((0..rows).map(|r| *image.get(r, c)));
        for (r, v) in convolve_reflect(&buffer, &kernel).into_iter().enumerate() {
            pass.set(r, c, v);
        }
    }

    // 沿列方向（axis 1）
    let mut out = pass.clone();
    for r in 0..rows {
        for (c, v) in convolve_reflect(pass.row(r), &kernel).into_iter().enumerate() {
            out.set(r, c, v);
        }
    }

    out
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// `d c b a | a b c d | d c b a`
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

fn convolve_reflect(line: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = line.len();
    let radius = (kernel.len() / 2) as isize;
    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * line[reflect_index(i + k as isize - radius, n)])
                .sum::<f64>()
        })
        .collect()
}
