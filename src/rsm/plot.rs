//! # 倒空间图绘制
//!
//! 使用 `plotters` 库把 RSM 强度图画成热图。
//!
//! ## 功能
//! - 实空间 (2θ–ω) 或倒空间 (Qx–Qy)
//! - 线性 / 对数色标（viridis），可固定色标范围 (vmin, vmax)
//! - 强度阈值：低于阈值的像素不绘制
//! - 固定坐标轴范围，超出部分裁剪
//! - 色条、等值线
//! - 扫描边界轮廓、峰位标记、弛豫线（完全应变点 → 无应变点）
//! - 支持 PNG 和 SVG 输出
//!
//! 倒空间网格不是矩形，每个像素按相邻采样点画成平行四边形。
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/solve.rs` 调用
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, RsmError};
use crate::models::{Grid2, ReciprocalPoint};
use crate::rsm::export::SolvedPeak;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 色条区域宽度（像素）
const COLORBAR_WIDTH: u32 = 150;
/// 色条渐变分段数
const COLORBAR_STEPS: usize = 128;

/// 色标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScale {
    #[default]
    Linear,
    Log,
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorScale::Linear => write!(f, "linear"),
            ColorScale::Log => write!(f, "log"),
        }
    }
}

impl FromStr for ColorScale {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "lin" => Ok(ColorScale::Linear),
            "log" | "logarithmic" => Ok(ColorScale::Log),
            other => Err(RsmError::InvalidArgument(format!(
                "unknown color scale '{}' (expected linear or log)",
                other
            ))),
        }
    }
}

/// 绘图选项
#[derive(Debug, Clone)]
pub struct MapPlotOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub color_scale: ColorScale,
    pub threshold: Option<f64>,
    /// 固定 x 轴范围，None 时按数据自动取
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    /// 色标覆盖的强度范围 (vmin, vmax)
    pub v_range: Option<(f64, f64)>,
    pub colorbar: bool,
    pub colorbar_label: Option<String>,
    /// 等值线条数，0 表示不画
    pub contour_levels: usize,
    pub draw_border: bool,
    pub use_svg: bool,
}

impl Default for MapPlotOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: "Qx".to_string(),
            y_label: "Qy".to_string(),
            width: 1000,
            height: 800,
            color_scale: ColorScale::Linear,
            threshold: None,
            x_range: None,
            y_range: None,
            v_range: None,
            colorbar: false,
            colorbar_label: None,
            contour_levels: 0,
            draw_border: false,
            use_svg: false,
        }
    }
}

/// 叠加在热图上的标记
#[derive(Debug, Clone, Default)]
pub struct PlotOverlay {
    pub markers: Vec<ReciprocalPoint>,
    pub lines: Vec<(ReciprocalPoint, ReciprocalPoint)>,
}

impl PlotOverlay {
    /// 测量点标记 + 每个峰的弛豫线
    pub fn from_solutions(solutions: &[SolvedPeak]) -> Self {
        Self {
            markers: solutions.iter().map(|s| s.measured).collect(),
            lines: solutions
                .iter()
                .map(|s| (s.result.full_strain_point, s.result.no_strain_point))
                .collect(),
        }
    }
}

fn plot_error<E: fmt::Debug>(e: E) -> RsmError {
    RsmError::Other(format!("{:?}", e))
}

/// 检查 (下限, 上限) 是否有效
fn check_range(name: &str, range: Option<(f64, f64)>) -> Result<()> {
    match range {
        Some((lo, hi)) if !(lo.is_finite() && hi.is_finite() && lo < hi) => {
            Err(RsmError::InvalidRange(format!(
                "{} [{}, {}] (lower must be below upper)",
                name, lo, hi
            )))
        }
        _ => Ok(()),
    }
}

/// 生成热图
pub fn generate_map_plot(
    x: &Grid2,
    y: &Grid2,
    intensity: &Grid2,
    overlay: &PlotOverlay,
    output_path: &Path,
    options: &MapPlotOptions,
) -> Result<()> {
    if x.shape() != intensity.shape() || y.shape() != intensity.shape() {
        return Err(RsmError::InvalidArgument(format!(
            "coordinate grids {:?}/{:?} do not match intensity grid {:?}",
            x.shape(),
            y.shape(),
            intensity.shape()
        )));
    }
    if intensity.is_empty() {
        return Err(RsmError::InvalidArgument("empty intensity map".to_string()));
    }
    check_range("x range", options.x_range)?;
    check_range("y range", options.y_range)?;

    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_map_chart(&root, x, y, intensity, overlay, options)?;
        root.present().map_err(|e| RsmError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_map_chart(&root, x, y, intensity, overlay, options)?;
        root.present().map_err(|e| RsmError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 绘制热图的核心逻辑
fn draw_map_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x: &Grid2,
    y: &Grid2,
    intensity: &Grid2,
    overlay: &PlotOverlay,
    options: &MapPlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let norm = ColorNorm::from_grid(
        intensity,
        options.color_scale,
        options.threshold,
        options.v_range,
    )?;

    let (main, bar) = if options.colorbar {
        let (width, _) = root.dim_in_pixel();
        let (main, bar) = root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));
        (main, Some(bar))
    } else {
        (root.clone(), None)
    };

    let view = ViewBox {
        x: axis_range(x, overlay.markers.iter().map(|p| p.qx), options.x_range)?,
        y: axis_range(y, overlay.markers.iter().map(|p| p.qy), options.y_range)?,
    };

    let mut chart = ChartBuilder::on(&main)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(view.x.0..view.x.1, view.y.0..view.y.1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let (rows, cols) = intensity.shape();
    let mut cells = Vec::with_capacity(rows * cols);
    for (r, c, &value) in intensity.indexed_iter() {
        if let Some(t) = norm.normalize(value) {
            let corners = cell_corners(x, y, r, c);
            if view.excludes(&corners) {
                continue;
            }
            let corners = corners.into_iter().map(|p| view.clamp(p)).collect::<Vec<_>>();
            cells.push(Polygon::new(corners, colormap(t).filled()));
        }
    }
    chart.draw_series(cells).map_err(plot_error)?;

    if options.contour_levels > 0 {
        let visible = intensity.map(|&v| match options.threshold {
            Some(t) if v < t => f64::NAN,
            _ => v,
        });
        let segments: Vec<_> = contour_levels(&visible, options.contour_levels)
            .into_iter()
            .flat_map(|level| contour_segments(x, y, &visible, level))
            .filter_map(|(a, b)| view.clip_segment(a, b))
            .collect();
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![a, b], BLACK.stroke_width(1))),
            )
            .map_err(plot_error)?;
    }

    if options.draw_border {
        let path = border_path(x, y);
        chart
            .draw_series(
                path.windows(2)
                    .filter_map(|w| view.clip_segment(w[0], w[1]))
                    .map(|(a, b)| PathElement::new(vec![a, b], BLACK.stroke_width(1))),
            )
            .map_err(plot_error)?;
    }

    for &(from, to) in &overlay.lines {
        if let Some((a, b)) = view.clip_segment((from.qx, from.qy), (to.qx, to.qy)) {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![a, b],
                    RED.stroke_width(2),
                )))
                .map_err(plot_error)?;
        }
    }

    chart
        .draw_series(
            overlay
                .markers
                .iter()
                .map(|p| (p.qx, p.qy))
                .filter(|&p| view.contains(p))
                .map(|p| Circle::new(p, 5, WHITE.stroke_width(2))),
        )
        .map_err(plot_error)?;

    if let Some(bar) = bar {
        draw_colorbar(&bar, &norm, options.colorbar_label.as_deref().unwrap_or(""))?;
    }

    Ok(())
}

/// 色条：纵轴为色标的值（对数色标时刻度显示原始强度）
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    norm: &ColorNorm,
    label: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let Some((low, high)) = norm.domain() else {
        return Ok(());
    };

    let scale = norm.scale;
    let formatter = move |v: &f64| match scale {
        ColorScale::Linear => tick_label(*v),
        ColorScale::Log => tick_label(v.exp()),
    };

    let mut chart = ChartBuilder::on(area)
        .margin_top(64)
        .margin_bottom(70)
        .margin_left(10)
        .margin_right(10)
        .right_y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, low..high)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(label)
        .y_label_formatter(&formatter)
        .y_label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_error)?;

    let step = (high - low) / COLORBAR_STEPS as f64;
    chart
        .draw_series((0..COLORBAR_STEPS).map(|i| {
            let y0 = low + step * i as f64;
            let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], colormap(t).filled())
        }))
        .map_err(plot_error)?;

    Ok(())
}

fn tick_label(v: f64) -> String {
    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-2..1e4).contains(&magnitude) {
        format!("{:.1e}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// 像素的平行四边形四角
fn cell_corners(x: &Grid2, y: &Grid2, r: usize, c: usize) -> Vec<(f64, f64)> {
    let (rows, cols) = x.shape();
    let step = |grid: &Grid2, r0: usize, c0: usize, r1: usize, c1: usize| {
        *grid.get(r1, c1) - *grid.get(r0, c0)
    };

    // 相邻采样点差值的一半
    let (cr0, cr1) = if c + 1 < cols { (c, c + 1) } else { (c.saturating_sub(1), c) };
    let (rr0, rr1) = if r + 1 < rows { (r, r + 1) } else { (r.saturating_sub(1), r) };

    let dc = (step(x, r, cr0, r, cr1) / 2.0, step(y, r, cr0, r, cr1) / 2.0);
    let dr = (step(x, rr0, c, rr1, c) / 2.0, step(y, rr0, c, rr1, c) / 2.0);
    let (px, py) = (*x.get(r, c), *y.get(r, c));

    vec![
        (px - dc.0 - dr.0, py - dc.1 - dr.1),
        (px + dc.0 - dr.0, py + dc.1 - dr.1),
        (px + dc.0 + dr.0, py + dc.1 + dr.1),
        (px - dc.0 + dr.0, py - dc.1 + dr.1),
    ]
}

/// 扫描边界：四个角点连成闭合折线
pub fn border_path(x: &Grid2, y: &Grid2) -> Vec<(f64, f64)> {
    let (rows, cols) = x.shape();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let (r, c) = (rows - 1, cols - 1);
    [(0, 0), (0, c), (r, c), (r, 0), (0, 0)]
        .iter()
        .map(|&(i, j)| (*x.get(i, j), *y.get(i, j)))
        .collect()
}

/// 坐标轴范围：指定时原样使用，否则按数据两侧各留 2%
fn axis_range(
    grid: &Grid2,
    extra: impl Iterator<Item = f64>,
    fixed: Option<(f64, f64)>,
) -> Result<(f64, f64)> {
    match fixed {
        Some(range) => {
            check_range("axis range", Some(range))?;
            Ok(range)
        }
        None => padded_range(grid, extra),
    }
}

fn padded_range(grid: &Grid2, extra: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    let (mut lo, mut hi) = match (grid.min(), grid.max()) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            return Err(RsmError::InvalidArgument(
                "coordinate grid has no finite values".to_string(),
            ))
        }
    };
    for v in extra.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }

    let pad = if hi > lo { (hi - lo) * 0.02 } else { 1.0 };
    Ok((lo - pad, hi + pad))
}

/// 绘图区域（数据坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewBox {
    x: (f64, f64),
    y: (f64, f64),
}

impl ViewBox {
    fn contains(&self, p: (f64, f64)) -> bool {
        (self.x.0..=self.x.1).contains(&p.0) && (self.y.0..=self.y.1).contains(&p.1)
    }

    fn clamp(&self, p: (f64, f64)) -> (f64, f64) {
        (p.0.clamp(self.x.0, self.x.1), p.1.clamp(self.y.0, self.y.1))
    }

    /// 所有顶点都在区域同一侧之外
    fn excludes(&self, points: &[(f64, f64)]) -> bool {
        points.iter().all(|p| p.0 < self.x.0)
            || points.iter().all(|p| p.0 > self.x.1)
            || points.iter().all(|p| p.1 < self.y.0)
            || points.iter().all(|p| p.1 > self.y.1)
    }

    /// Liang–Barsky 线段裁剪
    fn clip_segment(
        &self,
        a: (f64, f64),
        b: (f64, f64),
    ) -> Option<((f64, f64), (f64, f64))> {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

        for (p, q) in [
            (-dx, a.0 - self.x.0),
            (dx, self.x.1 - a.0),
            (-dy, a.1 - self.y.0),
            (dy, self.y.1 - a.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((
            (a.0 + t0 * dx, a.1 + t0 * dy),
            (a.0 + t1 * dx, a.1 + t1 * dy),
        ))
    }
}

/// 等值线高度：有限强度的最小值与最大值之间等分，不含两端
pub fn contour_levels(z: &Grid2, count: usize) -> Vec<f64> {
    let (lo, hi) = z
        .as_slice()
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if count == 0 || !(hi > lo) {
        return Vec::new();
    }
    let step = (hi - lo) / (count + 1) as f64;
    (1..=count).map(|i| lo + step * i as f64).collect()
}

/// 单一高度的等值线段（marching squares，顶点在采样点之间线性插值）
///
/// 含非有限值的格子跳过；鞍点按格子中心平均值决定连接方式。
pub fn contour_segments(
    x: &Grid2,
    y: &Grid2,
    z: &Grid2,
    level: f64,
) -> Vec<((f64, f64), (f64, f64))> {
    let (rows, cols) = z.shape();
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    let crossing = |a: (usize, usize), b: (usize, usize)| -> Option<(f64, f64)> {
        let (va, vb) = (*z.get(a.0, a.1), *z.get(b.0, b.1));
        if (va >= level) == (vb >= level) {
            return None;
        }
        let t = (level - va) / (vb - va);
        let (xa, ya) = (*x.get(a.0, a.1), *y.get(a.0, a.1));
        let (xb, yb) = (*x.get(b.0, b.1), *y.get(b.0, b.1));
        Some((xa + t * (xb - xa), ya + t * (yb - ya)))
    };

    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let corners = [(r, c), (r, c + 1), (r + 1, c + 1), (r + 1, c)];
            let values = corners.map(|(i, j)| *z.get(i, j));
            if values.iter().any(|v| !v.is_finite()) {
                continue;
            }

            let edges = [0, 1, 2, 3].map(|k| crossing(corners[k], corners[(k + 1) % 4]));
            match edges {
                [Some(e0), Some(e1), Some(e2), Some(e3)] => {
                    let centre = values.iter().sum::<f64>() / 4.0;
                    if (values[0] >= level) == (centre >= level) {
                        segments.push((e0, e1));
                        segments.push((e2, e3));
                    } else {
                        segments.push((e3, e0));
                        segments.push((e1, e2));
                    }
                }
                _ => {
                    let hits: Vec<(f64, f64)> = edges.iter().flatten().copied().collect();
                    if let &[a, b] = hits.as_slice() {
                        segments.push((a, b));
                    }
                }
            }
        }
    }

    segments
}

/// 强度 → [0, 1]
#[derive(Debug, Clone, Copy)]
struct ColorNorm {
    scale: ColorScale,
    threshold: Option<f64>,
    low: f64,
    high: f64,
}

impl ColorNorm {
    /// `v_range` 给出时色标固定在 (vmin, vmax)，超出的值取端点颜色
    fn from_grid(
        intensity: &Grid2,
        scale: ColorScale,
        threshold: Option<f64>,
        v_range: Option<(f64, f64)>,
    ) -> Result<Self> {
        let (low, high) = match v_range {
            Some(range) => {
                check_range("color range", Some(range))?;
                if scale == ColorScale::Log && range.0 <= 0.0 {
                    return Err(RsmError::InvalidRange(format!(
                        "color range [{}, {}] (log scale needs a positive lower bound)",
                        range.0, range.1
                    )));
                }
                range
            }
            None => intensity
                .as_slice()
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .filter(|&v| threshold.map_or(true, |t| v >= t))
                .filter(|&v| scale == ColorScale::Linear || v > 0.0)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                }),
        };

        let (low, high) = match scale {
            ColorScale::Linear => (low, high),
            ColorScale::Log => (low.ln(), high.ln()),
        };

        Ok(Self {
            scale,
            threshold,
            low,
            high,
        })
    }

    /// 色标覆盖的值域（对数色标为 ln 值）
    fn domain(&self) -> Option<(f64, f64)> {
        (self.low.is_finite() && self.high.is_finite() && self.high > self.low)
            .then_some((self.low, self.high))
    }

    fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() || !self.low.is_finite() {
            return None;
        }
        if let Some(t) = self.threshold {
            if value < t {
                return None;
            }
        }
        let v = match self.scale {
            ColorScale::Linear => value,
            ColorScale::Log if value > 0.0 => value.ln(),
            ColorScale::Log => return None,
        };
        if self.high > self.low {
            Some(((v - self.low) / (self.high - self.low)).clamp(0.0, 1.0))
        } else {
            Some(0.5)
        }
    }
}

/// viridis 色图
pub fn colormap(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    ColorMap::<RGBColor, f64>::get_color_normalized(&ViridisRGB, t, 0.0, 1.0)
}
