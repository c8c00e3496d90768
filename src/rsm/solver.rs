//! # 组分与应变弛豫求解
//!
//! 给定测量峰位与衬底参考峰位，求三元合金组分 t* 使得测量点落在
//! 过理论峰位、斜率为 D(t) 的应变线上：
//!
//! ```text
//! f(t) = D(t)·(Qx_m − Qx_th(t)) − (Qy_m − Qy_th(t)) = 0
//! ```
//!
//! 然后由 Qx 比值计算弛豫度：
//!
//! ```text
//! R = (1 − Qx_ref / Qx_m) / (1 − Qx_ref / Qx_th(t*))
//! ```
//!
//! R = 0 表示与衬底完全匹配（完全应变），R = 1 表示完全弛豫。
//!
//! ## 依赖关系
//! - 被 `commands/solve.rs` 调用
//! - 使用 `rsm/alloy.rs`, `rsm/reciprocal.rs`, `rsm/roots.rs`

use crate::error::{Result, RsmError};
use crate::models::{
    AlloyParameterSet, AlloyType, AxisPair, Hkl, ReciprocalPoint, SolutionResult, Structure,
    TernaryParameters,
};
use crate::rsm::constants::{DEFAULT_SCALE, DIVISION_EPSILON};
use crate::rsm::roots::{self, RootMethod, RootOptions};
use crate::rsm::{alloy, reciprocal};

/// 求解过程观察者
///
/// 数值核心不做任何输出，需要日志时由调用方注入。
pub trait SolveObserver: Sync {
    /// 每次残差求值后调用
    fn on_evaluation(&self, _call: usize, _composition: f64, _residual: f64) {}

    /// 求解成功后调用
    fn on_solution(&self, _measured: &ReciprocalPoint, _result: &SolutionResult) {}
}

/// 求解配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub alloy_type: AlloyType,
    pub structure: Structure,
    pub hkl: Hkl,
    /// 理论峰位的缩放（需与测量图一致）
    pub scale: AxisPair,
    /// 只用于显示的理论峰位平移，求解时不参与计算
    pub shift: AxisPair,
    /// 组分搜索区间
    pub interval: (f64, f64),
    pub method: RootMethod,
    pub options: RootOptions,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            alloy_type: AlloyType::Ternary,
            structure: Structure::Wurtzite,
            hkl: Hkl::default(),
            scale: AxisPair::uniform(DEFAULT_SCALE),
            shift: AxisPair::ZERO,
            interval: (0.0, 1.0),
            method: RootMethod::Brent,
            options: RootOptions::default(),
        }
    }
}

/// 组分/弛豫求解器
///
/// 无内部状态，同一实例可以在多个线程中并发调用 `solve`。
pub struct StrainSolver<'a> {
    params: TernaryParameters,
    config: SolverConfig,
    observer: Option<&'a dyn SolveObserver>,
}

impl<'a> StrainSolver<'a> {
    pub fn new(params: TernaryParameters, config: SolverConfig) -> Self {
        Self {
            params,
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn SolveObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 组分 t 处的合金参数与理论峰位（不平移）
    pub fn theoretical_peak(&self, t: f64) -> Result<(AlloyParameterSet, ReciprocalPoint)> {
        self.peak_with_shift(t, AxisPair::ZERO)
    }

    /// 加上 `shift` 之后的理论峰位，用于显示
    pub fn displayed_peak(&self, t: f64) -> Result<(AlloyParameterSet, ReciprocalPoint)> {
        self.peak_with_shift(t, self.config.shift)
    }

    fn peak_with_shift(
        &self,
        t: f64,
        shift: AxisPair,
    ) -> Result<(AlloyParameterSet, ReciprocalPoint)> {
        let set = alloy::alloy_parameters(
            t,
            &self.params,
            self.config.alloy_type,
            self.config.structure,
        )?;
        let point = reciprocal::theoretical_qxy(
            set.a,
            set.c,
            self.config.hkl,
            self.config.structure,
            self.config.scale,
            shift,
        )?;
        Ok((set, point))
    }

    /// 残差 f(t)
    pub fn residual(&self, t: f64, measured: ReciprocalPoint) -> Result<f64> {
        let (set, theory) = self.theoretical_peak(t)?;
        Ok(set.d * (measured.qx - theory.qx) - (measured.qy - theory.qy))
    }

    /// 求解单个峰
    pub fn solve(
        &self,
        measured: ReciprocalPoint,
        reference: ReciprocalPoint,
    ) -> Result<SolutionResult> {
        self.config.alloy_type.ensure_supported()?;
        self.config.structure.ensure_supported()?;

        let (lower, upper) = self.config.interval;
        if lower < 0.0 || upper > 1.0 || lower >= upper {
            return Err(RsmError::InvalidRange(format!(
                "composition interval [{}, {}] (must satisfy 0 <= lower < upper <= 1)",
                lower, upper
            )));
        }

        let observer = self.observer;
        let mut trace = |call: usize, t: f64, residual: f64| {
            if let Some(obs) = observer {
                obs.on_evaluation(call, t, residual);
            }
        };

        let root = roots::find_root(
            self.config.method,
            |t| self.residual(t, measured),
            lower,
            upper,
            &self.config.options,
            Some(&mut trace as &mut dyn FnMut(usize, f64, f64)),
        )?;

        let (set, no_strain) = self.theoretical_peak(root.root)?;
        let relaxation = relaxation(measured.qx, reference.qx, no_strain.qx)?;

        let result = SolutionResult {
            composition: root.root,
            relaxation_percent: relaxation * 100.0,
            converged: true,
            iterations: root.iterations,
            alloy: set,
            no_strain_point: no_strain,
            full_strain_point: full_strain_point(reference, no_strain, set.d),
        };

        if let Some(obs) = observer {
            obs.on_solution(&measured, &result);
        }

        Ok(result)
    }
}

/// 由 Qx 比值计算弛豫度（分数）
///
/// `qx_relaxed` 为同组分无应变时的理论 Qx。
pub fn relaxation(qx_measured: f64, qx_reference: f64, qx_relaxed: f64) -> Result<f64> {
    if qx_measured.abs() < DIVISION_EPSILON || qx_relaxed.abs() < DIVISION_EPSILON {
        return Err(RsmError::DomainError(format!(
            "relaxation undefined for Qx_measured = {}, Qx_relaxed = {}",
            qx_measured, qx_relaxed
        )));
    }

    let numerator = 1.0 - qx_reference / qx_measured;
    let denominator = 1.0 - qx_reference / qx_relaxed;

    if denominator.abs() < DIVISION_EPSILON {
        let reason = if numerator.abs() < DIVISION_EPSILON {
            "indeterminate (measured, reference and relaxed Qx coincide)"
        } else {
            "undefined (reference Qx equals the relaxed Qx)"
        };
        return Err(RsmError::DomainError(format!("relaxation {}", reason)));
    }

    Ok(numerator / denominator)
}

/// 完全应变点：Qx 与参考峰相同，沿斜率 D 的应变线从无应变点出发
pub fn full_strain_point(
    reference: ReciprocalPoint,
    no_strain: ReciprocalPoint,
    d: f64,
) -> ReciprocalPoint {
    ReciprocalPoint::new(
        reference.qx,
        no_strain.qy + d * (reference.qx - no_strain.qx),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsm::materials::MaterialTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ingan_solver() -> StrainSolver<'static> {
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        StrainSolver::new(params, SolverConfig::default())
    }

    fn gan_reference(solver: &StrainSolver) -> ReciprocalPoint {
        solver.theoretical_peak(0.0).unwrap().1
    }

    #[test]
    fn test_recovers_composition_fully_relaxed() {
        let solver = ingan_solver();
        let reference = gan_reference(&solver);
        let t0 = 0.2;
        let (_, measured) = solver.theoretical_peak(t0).unwrap();

        let result = solver.solve(measured, reference).unwrap();
        assert!(result.converged);
        assert!((result.composition - t0).abs() < 1e-9);
        assert!((result.relaxation_percent - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_recovers_composition_fully_strained() {
        let solver = ingan_solver();
        let reference = gan_reference(&solver);
        let t0 = 0.15;
        let (set, relaxed) = solver.theoretical_peak(t0).unwrap();
        let measured = full_strain_point(reference, relaxed, set.d);

        let result = solver.solve(measured, reference).unwrap();
        assert!((result.composition - t0).abs() < 1e-9);
        assert!(result.relaxation_percent.abs() < 1e-6);
        assert!((result.full_strain_point.qx - reference.qx).abs() < 1e-9);
        assert!((result.full_strain_point.qy - measured.qy).abs() < 1e-6);
    }

    #[test]
    fn test_partially_relaxed_point() {
        let solver = ingan_solver();
        let reference = gan_reference(&solver);
        let t0 = 0.3;
        let (set, relaxed) = solver.theoretical_peak(t0).unwrap();

        // 应变线中点
        let qx = reference.qx + 0.5 * (relaxed.qx - reference.qx);
        let measured = ReciprocalPoint::new(qx, relaxed.qy + set.d * (qx - relaxed.qx));

        let result = solver.solve(measured, reference).unwrap();
        assert!((result.composition - t0).abs() < 1e-9);

        let expected =
            (1.0 - reference.qx / measured.qx) / (1.0 - reference.qx / relaxed.qx) * 100.0;
        assert!((result.relaxation_percent - expected).abs() < 1e-9);
        assert!((result.relaxation_percent - 49.1765).abs() < 1e-3);
    }

    #[test]
    fn test_display_shift_does_not_change_solution() {
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let plain = StrainSolver::new(params, SolverConfig::default());
        let shifted = StrainSolver::new(
            params,
            SolverConfig {
                shift: AxisPair::new(-500.0, 0.0),
                ..SolverConfig::default()
            },
        );

        let reference = plain.theoretical_peak(0.0).unwrap().1;
        let (set, relaxed) = plain.theoretical_peak(0.3).unwrap();
        let qx = reference.qx + 0.5 * (relaxed.qx - reference.qx);
        let measured = ReciprocalPoint::new(qx, relaxed.qy + set.d * (qx - relaxed.qx));

        let a = plain.solve(measured, reference).unwrap();
        let b = shifted.solve(measured, reference).unwrap();
        assert_eq!(a, b);

        // 平移只作用于显示的峰位
        let shown = shifted.displayed_peak(0.3).unwrap().1;
        assert!((shown.qx - (relaxed.qx - 500.0)).abs() < 1e-9);
        assert!((shown.qy - relaxed.qy).abs() < 1e-9);
    }

    #[test]
    fn test_bisection_agrees_with_brent() {
        let params = MaterialTable::builtin().alloy("AlGaN").unwrap();
        let brent = StrainSolver::new(params, SolverConfig::default());
        let bisect = StrainSolver::new(
            params,
            SolverConfig {
                method: RootMethod::Bisection,
                ..SolverConfig::default()
            },
        );
        let reference = brent.theoretical_peak(0.0).unwrap().1;
        let measured = brent.theoretical_peak(0.42).unwrap().1;

        let a = brent.solve(measured, reference).unwrap();
        let b = bisect.solve(measured, reference).unwrap();
        assert!((a.composition - b.composition).abs() < 1e-9);
        assert!((a.composition - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_interval_without_root() {
        let mut config = SolverConfig::default();
        config.interval = (0.5, 1.0);
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let solver = StrainSolver::new(params, config);
        let reference = solver.theoretical_peak(0.0).unwrap().1;
        let measured = solver.theoretical_peak(0.2).unwrap().1;

        assert!(matches!(
            solver.solve(measured, reference),
            Err(RsmError::InvalidBracket { .. })
        ));
    }

    #[test]
    fn test_iteration_budget() {
        let mut config = SolverConfig::default();
        config.method = RootMethod::Bisection;
        config.options.max_iterations = 2;
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let solver = StrainSolver::new(params, config);
        let reference = solver.theoretical_peak(0.0).unwrap().1;
        let measured = solver.theoretical_peak(0.2).unwrap().1;

        assert!(matches!(
            solver.solve(measured, reference),
            Err(RsmError::RootNotConverged { .. })
        ));
    }

    #[test]
    fn test_interval_out_of_range() {
        let mut config = SolverConfig::default();
        config.interval = (-0.1, 1.0);
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let solver = StrainSolver::new(params, config);
        let p = ReciprocalPoint::new(3500.0, 9500.0);
        assert!(matches!(
            solver.solve(p, p),
            Err(RsmError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_indeterminate_relaxation() {
        let solver = ingan_solver();
        let reference = gan_reference(&solver);
        // 测量点就是衬底峰：t* = 0，分子分母同时为零
        assert!(matches!(
            solver.solve(reference, reference),
            Err(RsmError::DomainError(_))
        ));
    }

    #[test]
    fn test_unsupported_structure() {
        let mut config = SolverConfig::default();
        config.structure = Structure::ZincBlende;
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let solver = StrainSolver::new(params, config);
        let p = ReciprocalPoint::new(3500.0, 9500.0);
        assert!(matches!(
            solver.solve(p, p),
            Err(RsmError::UnsupportedStructure(_))
        ));
    }

    #[test]
    fn test_relaxation_formula() {
        assert!(relaxation(3600.0, 3600.0, 3500.0).unwrap().abs() < 1e-12);
        assert!((relaxation(3500.0, 3600.0, 3500.0).unwrap() - 1.0).abs() < 1e-12);
        assert!(matches!(
            relaxation(3550.0, 3600.0, 3600.0),
            Err(RsmError::DomainError(_))
        ));
        assert!(matches!(
            relaxation(0.0, 3600.0, 3500.0),
            Err(RsmError::DomainError(_))
        ));
    }

    struct CountingObserver {
        evaluations: AtomicUsize,
        solutions: AtomicUsize,
    }

    impl SolveObserver for CountingObserver {
        fn on_evaluation(&self, _call: usize, _t: f64, _r: f64) {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
        }

        fn on_solution(&self, _measured: &ReciprocalPoint, _result: &SolutionResult) {
            self.solutions.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_observer_receives_events() {
        let observer = CountingObserver {
            evaluations: AtomicUsize::new(0),
            solutions: AtomicUsize::new(0),
        };
        let params = MaterialTable::builtin().alloy("InGaN").unwrap();
        let solver = StrainSolver::new(params, SolverConfig::default()).with_observer(&observer);
        let reference = solver.theoretical_peak(0.0).unwrap().1;
        let measured = solver.theoretical_peak(0.25).unwrap().1;

        let result = solver.solve(measured, reference).unwrap();
        assert!(observer.evaluations.load(Ordering::Relaxed) >= 2);
        assert_eq!(observer.solutions.load(Ordering::Relaxed), 1);
        assert!(result.iterations > 0);
    }

    #[test]
    fn test_solve_is_idempotent() {
        let solver = ingan_solver();
        let reference = gan_reference(&solver);
        let measured = ReciprocalPoint::new(3550.0, 9450.0);
        let a = solver.solve(measured, reference);
        let b = solver.solve(measured, reference);
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => panic!("solve results differ between calls"),
        }
    }
}
