//! # 三元合金参数插值
//!
//! ## 公式
//! value(t) = A·t + B·(1 − t) + b·t·(1 − t)
//!
//! 对 a, c, C13, C33 四个参数分别使用各自的 (A, B, b) 独立插值，
//! 再由插值后的弹性常数得到畸变系数 D。
//!
//! ## 依赖关系
//! - 被 `rsm/solver.rs` 在求根循环中调用
//! - 使用 `rsm/distortion.rs` 计算 D
//! - 使用 `models/alloy.rs`

use crate::error::Result;
use crate::models::{
    AlloyParameterSet, AlloyType, BinaryEndpointParameters, Structure, TernaryParameters,
};
use crate::rsm::distortion;

/// 三元插值（t 不做范围限制，由调用方负责）
pub fn ternary_interpolate(t: f64, value_a: f64, value_b: f64, bowing: f64) -> f64 {
    value_a * t + value_b * (1.0 - t) + bowing * t * (1.0 - t)
}

/// 对四个端点参数分别插值
pub fn interpolate_endpoints(t: f64, params: &TernaryParameters) -> BinaryEndpointParameters {
    let a = &params.endpoint_a;
    let b = &params.endpoint_b;
    let bow = &params.bowing;

    BinaryEndpointParameters {
        lattice_a: ternary_interpolate(t, a.lattice_a, b.lattice_a, bow.lattice_a),
        lattice_c: ternary_interpolate(t, a.lattice_c, b.lattice_c, bow.lattice_c),
        elastic_c13: ternary_interpolate(t, a.elastic_c13, b.elastic_c13, bow.elastic_c13),
        elastic_c33: ternary_interpolate(t, a.elastic_c33, b.elastic_c33, bow.elastic_c33),
    }
}

/// 计算组分 t 处的完整合金参数集
pub fn alloy_parameters(
    t: f64,
    params: &TernaryParameters,
    alloy_type: AlloyType,
    structure: Structure,
) -> Result<AlloyParameterSet> {
    alloy_type.ensure_supported()?;
    structure.ensure_supported()?;

    let p = interpolate_endpoints(t, params);
    let d = distortion::distortion_coefficient(p.elastic_c13, p.elastic_c33, structure)?;

    Ok(AlloyParameterSet {
        a: p.lattice_a,
        c: p.lattice_c,
        c13: p.elastic_c13,
        c33: p.elastic_c33,
        d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RsmError;
    use crate::models::Bowing;

    fn endpoints() -> TernaryParameters {
        TernaryParameters::new(
            BinaryEndpointParameters::new(5.0, 8.0, 100.0, 400.0),
            BinaryEndpointParameters::new(5.2, 9.0, 120.0, 300.0),
        )
    }

    #[test]
    fn test_linear_blend_without_bowing() {
        assert!((ternary_interpolate(0.5, 5.0, 5.2, 0.0) - 5.1).abs() < 1e-12);
        for &t in &[0.0, 0.1, 0.37, 0.9, 1.0] {
            let expected = 5.0 * t + 5.2 * (1.0 - t);
            assert!((ternary_interpolate(t, 5.0, 5.2, 0.0) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_endpoints_recovered() {
        let params = endpoints();
        let at_one = interpolate_endpoints(1.0, &params);
        let at_zero = interpolate_endpoints(0.0, &params);
        assert_eq!(at_one, params.endpoint_a);
        assert_eq!(at_zero, params.endpoint_b);
    }

    #[test]
    fn test_bowing_applied_per_parameter() {
        let params = endpoints().with_bowing(Bowing {
            lattice_a: 0.4,
            ..Bowing::default()
        });
        let p = interpolate_endpoints(0.5, &params);
        // 5.1 + 0.4 * 0.25
        assert!((p.lattice_a - 5.2).abs() < 1e-12);
        assert!((p.lattice_c - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_alloy_parameters_distortion() {
        let set = alloy_parameters(1.0, &endpoints(), AlloyType::Ternary, Structure::Wurtzite)
            .unwrap();
        assert!((set.d - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_alloy_parameters_rejects_unsupported() {
        let params = endpoints();
        assert!(matches!(
            alloy_parameters(0.5, &params, AlloyType::Quaternary, Structure::Wurtzite),
            Err(RsmError::UnsupportedAlloyType(_))
        ));
        assert!(matches!(
            alloy_parameters(0.5, &params, AlloyType::Ternary, Structure::ZincBlende),
            Err(RsmError::UnsupportedStructure(_))
        ));
    }
}
