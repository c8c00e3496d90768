//! # 实空间 → 倒空间变换
//!
//! ## 测量值
//! ```text
//! Qx = R·(cos ω − cos(2θ − ω))·scale + shift_x
//! Qy = R·(sin ω + sin(2θ − ω))·scale + shift_y
//! ```
//!
//! ## 理论值（纤锌矿）
//! ```text
//! qx_factor = (2/√3)·(h² + k² + hk),  qy_factor = l
//! Qx = qx_factor / a · scale_x + shift_x
//! Qy = qy_factor / c · scale_y + shift_y
//! ```
//!
//! ## 依赖关系
//! - 被 `rsm/solver.rs` 和 `commands/` 调用
//! - 使用 `rsm/constants.rs` 的角度换算常数

use crate::error::{Result, RsmError};
use crate::models::{AxisPair, Grid2, Hkl, ReciprocalPoint, ScanData, Structure};
use crate::rsm::constants::{DEGREE_TO_RADIAN, DIVISION_EPSILON};

/// 测量得到的 Qx/Qy 网格
#[derive(Debug, Clone)]
pub struct QxyMap {
    pub qx: Grid2,
    pub qy: Grid2,
}

/// 在 [start, end] 上等距取 num 个点（含端点）
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// 由扫描角度计算测量的 (Qx, Qy) 网格
pub fn measured_qxy(
    omega: &[f64],
    two_theta_ranges: &[(f64, f64)],
    columns: usize,
    shift: AxisPair,
    r_value: f64,
    scale: f64,
) -> Result<QxyMap> {
    if omega.len() != two_theta_ranges.len() {
        return Err(RsmError::InvalidArgument(format!(
            "{} ω values but {} 2θ ranges",
            omega.len(),
            two_theta_ranges.len()
        )));
    }

    let rows = omega.len();
    let mut qx = Vec::with_capacity(rows * columns);
    let mut qy = Vec::with_capacity(rows * columns);

    for (&omega_deg, &(start, end)) in omega.iter().zip(two_theta_ranges) {
        let omega_rad = omega_deg * DEGREE_TO_RADIAN;
        let (sin_omega, cos_omega) = omega_rad.sin_cos();

        for two_theta in linspace(start, end, columns) {
            let exit_rad = (two_theta - omega_deg) * DEGREE_TO_RADIAN;
            let (sin_exit, cos_exit) = exit_rad.sin_cos();

            qx.push(r_value * (cos_omega - cos_exit) * scale + shift.x);
            qy.push(r_value * (sin_omega + sin_exit) * scale + shift.y);
        }
    }

    Ok(QxyMap {
        qx: Grid2::new(rows, columns, qx)?,
        qy: Grid2::new(rows, columns, qy)?,
    })
}

/// 对整个扫描做倒空间变换
pub fn scan_to_reciprocal(
    scan: &ScanData,
    shift: AxisPair,
    r_value: f64,
    scale: f64,
) -> Result<QxyMap> {
    scan.validate()?;
    measured_qxy(
        &scan.omega,
        &scan.two_theta_ranges,
        scan.columns(),
        shift,
        r_value,
        scale,
    )
}

/// 反射的几何因子 (qx_factor, qy_factor)
pub fn reflection_factors(hkl: Hkl, structure: Structure) -> Result<(f64, f64)> {
    match structure.ensure_supported()? {
        Structure::Wurtzite => {
            let (h, k, l) = (hkl.h as f64, hkl.k as f64, hkl.l as f64);
            let qx_factor = 2.0 / 3f64.sqrt() * (h * h + k * k + h * k);
            Ok((qx_factor, l))
        }
        other => Err(RsmError::UnsupportedStructure(other.to_string())),
    }
}

/// 由晶格常数计算理论峰位
///
/// `scale` 与 `shift` 可以是标量（两轴相同）或分轴的 (x, y)。
pub fn theoretical_qxy(
    a: f64,
    c: f64,
    hkl: Hkl,
    structure: Structure,
    scale: impl Into<AxisPair>,
    shift: impl Into<AxisPair>,
) -> Result<ReciprocalPoint> {
    let (qx_factor, qy_factor) = reflection_factors(hkl, structure)?;

    if a.abs() < DIVISION_EPSILON || c.abs() < DIVISION_EPSILON {
        return Err(RsmError::DomainError(format!(
            "reciprocal coordinates undefined for a = {}, c = {}",
            a, c
        )));
    }

    let scale = scale.into();
    let shift = shift.into();

    Ok(ReciprocalPoint::new(
        qx_factor / a * scale.x + shift.x,
        qy_factor / c * scale.y + shift.y,
    ))
}

/// 由理论峰位反推晶格常数 (a, c)
pub fn lattice_from_qxy(
    point: ReciprocalPoint,
    hkl: Hkl,
    structure: Structure,
    scale: impl Into<AxisPair>,
    shift: impl Into<AxisPair>,
) -> Result<(f64, f64)> {
    let (qx_factor, qy_factor) = reflection_factors(hkl, structure)?;
    let scale = scale.into();
    let shift = shift.into();

    let qx = point.qx - shift.x;
    let qy = point.qy - shift.y;

    if qx.abs() < DIVISION_EPSILON || qy.abs() < DIVISION_EPSILON {
        return Err(RsmError::DomainError(format!(
            "lattice constants undefined for shifted point ({}, {})",
            qx, qy
        )));
    }
    if qx_factor.abs() < DIVISION_EPSILON || qy_factor.abs() < DIVISION_EPSILON {
        return Err(RsmError::DomainError(format!(
            "reflection {} does not determine both a and c",
            hkl
        )));
    }

    Ok((qx_factor * scale.x / qx, qy_factor * scale.y / qy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_inclusive() {
        assert_eq!(linspace(20.0, 30.0, 3), vec![20.0, 25.0, 30.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        let v = linspace(0.1, 0.7, 7);
        assert_eq!(*v.last().unwrap(), 0.7);
    }

    #[test]
    fn test_measured_qxy_single_row() {
        let map = measured_qxy(&[10.0], &[(20.0, 30.0)], 3, AxisPair::ZERO, 1.0, 1.0).unwrap();
        assert_eq!(map.qx.shape(), (1, 3));
        assert_eq!(map.qy.shape(), (1, 3));

        // 2θ = 25°: cos10° − cos15°, sin10° + sin15°
        let qx = *map.qx.get(0, 1);
        let qy = *map.qy.get(0, 1);
        assert!((qx - 0.018882).abs() < 1e-3, "qx = {}", qx);
        assert!((qy - 0.432467).abs() < 1e-3, "qy = {}", qy);
    }

    #[test]
    fn test_measured_qxy_shift_and_scale() {
        let base = measured_qxy(&[10.0], &[(20.0, 30.0)], 3, AxisPair::ZERO, 1.0, 1.0).unwrap();
        let moved = measured_qxy(
            &[10.0],
            &[(20.0, 30.0)],
            3,
            AxisPair::new(1.0, -2.0),
            2.0,
            10_000.0,
        )
        .unwrap();
        for j in 0..3 {
            let expected_x = *base.qx.get(0, j) * 2.0 * 10_000.0 + 1.0;
            let expected_y = *base.qy.get(0, j) * 2.0 * 10_000.0 - 2.0;
            assert!((*moved.qx.get(0, j) - expected_x).abs() < 1e-9);
            assert!((*moved.qy.get(0, j) - expected_y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_measured_qxy_row_mismatch() {
        let result = measured_qxy(&[10.0, 11.0], &[(20.0, 30.0)], 3, AxisPair::ZERO, 1.0, 1.0);
        assert!(matches!(result, Err(RsmError::InvalidArgument(_))));
    }

    #[test]
    fn test_symmetric_scan_has_zero_qx() {
        // ω = θ 时 Qx = 0
        let map = measured_qxy(&[17.0], &[(34.0, 34.0)], 1, AxisPair::ZERO, 1.0, 1.0).unwrap();
        assert!(map.qx.get(0, 0).abs() < 1e-12);
    }

    #[test]
    fn test_theoretical_qxy_105() {
        let p = theoretical_qxy(3.2, 5.2, Hkl::new(1, 0, 5), Structure::Wurtzite, 10_000.0, 0.0)
            .unwrap();
        assert!((p.qx - 3608.439).abs() < 1e-3, "qx = {}", p.qx);
        assert!((p.qy - 9615.385).abs() < 1e-3, "qy = {}", p.qy);
    }

    #[test]
    fn test_theoretical_qxy_per_axis_scale() {
        let uniform =
            theoretical_qxy(3.2, 5.2, Hkl::default(), Structure::Wurtzite, 1.0, 0.0).unwrap();
        let per_axis = theoretical_qxy(
            3.2,
            5.2,
            Hkl::default(),
            Structure::Wurtzite,
            (2.0, 3.0),
            [0.5, -0.5],
        )
        .unwrap();
        assert!((per_axis.qx - (uniform.qx * 2.0 + 0.5)).abs() < 1e-12);
        assert!((per_axis.qy - (uniform.qy * 3.0 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_theoretical_qxy_errors() {
        assert!(matches!(
            theoretical_qxy(3.2, 5.2, Hkl::default(), Structure::ZincBlende, 1.0, 0.0),
            Err(RsmError::UnsupportedStructure(_))
        ));
        assert!(matches!(
            theoretical_qxy(0.0, 5.2, Hkl::default(), Structure::Wurtzite, 1.0, 0.0),
            Err(RsmError::DomainError(_))
        ));
        assert!(matches!(
            theoretical_qxy(3.2, 0.0, Hkl::default(), Structure::Wurtzite, 1.0, 0.0),
            Err(RsmError::DomainError(_))
        ));
    }

    #[test]
    fn test_lattice_round_trip() {
        let scale = AxisPair::new(10_000.0, 9_000.0);
        let shift = AxisPair::new(12.0, -7.0);
        for &(a, c, hkl) in &[
            (3.189, 5.185, Hkl::new(1, 0, 5)),
            (3.545, 5.703, Hkl::new(1, 1, 4)),
            (3.112, 4.982, Hkl::new(2, 0, -5)),
        ] {
            let p = theoretical_qxy(a, c, hkl, Structure::Wurtzite, scale, shift).unwrap();
            let (a2, c2) = lattice_from_qxy(p, hkl, Structure::Wurtzite, scale, shift).unwrap();
            assert!((a2 - a).abs() < 1e-10);
            assert!((c2 - c).abs() < 1e-10);
        }
    }

    #[test]
    fn test_lattice_from_symmetric_reflection_fails() {
        let p = ReciprocalPoint::new(0.0, 1000.0);
        assert!(matches!(
            lattice_from_qxy(p, Hkl::new(0, 0, 2), Structure::Wurtzite, 1.0, 0.0),
            Err(RsmError::DomainError(_))
        ));
    }
}
