//! # 区间求根
//!
//! 提供两种需要变号区间的标量求根方法：
//! - Brent–Dekker 法（逆二次插值 + 割线 + 二分，超线性收敛）
//! - 二分法
//!
//! 收敛判据与 scipy `brentq`/`bisect` 一致：|Δx| < xtol + rtol·|x|。
//! 区间端点同号时直接报错，迭代耗尽时返回 `RootNotConverged`，
//! 不返回未收敛的结果。
//!
//! ## 依赖关系
//! - 被 `rsm/solver.rs` 调用

use crate::error::{Result, RsmError};

use std::str::FromStr;

/// 求根方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootMethod {
    #[default]
    Brent,
    Bisection,
}

impl std::fmt::Display for RootMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootMethod::Brent => write!(f, "brentq"),
            RootMethod::Bisection => write!(f, "bisect"),
        }
    }
}

impl FromStr for RootMethod {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "brentq" | "brent" => Ok(RootMethod::Brent),
            "bisect" | "bisection" => Ok(RootMethod::Bisection),
            name @ ("newton" | "secant" | "halley") => Err(RsmError::InvalidArgument(format!(
                "Root method '{}' needs derivatives or a starting guess; use a bracketing method (brentq, bisect)",
                name
            ))),
            other => Err(RsmError::InvalidArgument(format!(
                "Unknown root method '{}'",
                other
            ))),
        }
    }
}

/// 收敛参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    /// 绝对容差
    pub xtol: f64,
    /// 相对容差
    pub rtol: f64,
    /// 最大迭代次数
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

/// 求根结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSolution {
    pub root: f64,
    pub iterations: usize,
    pub function_calls: usize,
}

/// 求根函数：返回 Result 以便模型错误（如除零）直接向上传递
struct Evaluator<'a, F> {
    f: F,
    calls: usize,
    trace: Option<&'a mut dyn FnMut(usize, f64, f64)>,
}

impl<F: FnMut(f64) -> Result<f64>> Evaluator<'_, F> {
    fn eval(&mut self, x: f64) -> Result<f64> {
        let y = (self.f)(x)?;
        self.calls += 1;
        if !y.is_finite() {
            return Err(RsmError::DomainError(format!(
                "residual is not finite at x = {}",
                x
            )));
        }
        if let Some(trace) = self.trace.as_mut() {
            trace(self.calls, x, y);
        }
        Ok(y)
    }
}

/// 在 [lower, upper] 内求 f 的零点
///
/// `trace` 在每次函数求值后以 (调用序号, x, f(x)) 回调。
pub fn find_root<F>(
    method: RootMethod,
    f: F,
    lower: f64,
    upper: f64,
    options: &RootOptions,
    trace: Option<&mut dyn FnMut(usize, f64, f64)>,
) -> Result<RootSolution>
where
    F: FnMut(f64) -> Result<f64>,
{
    if options.xtol.is_nan() || options.xtol <= 0.0 {
        return Err(RsmError::InvalidArgument(format!(
            "xtol must be positive, got {}",
            options.xtol
        )));
    }
    if options.rtol < 4.0 * f64::EPSILON {
        return Err(RsmError::InvalidArgument(format!(
            "rtol too small ({} < {:e})",
            options.rtol,
            4.0 * f64::EPSILON
        )));
    }
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(RsmError::InvalidRange(format!(
            "search interval [{}, {}]",
            lower, upper
        )));
    }

    let mut eval = Evaluator { f, calls: 0, trace };

    match method {
        RootMethod::Brent => brent(&mut eval, lower, upper, options),
        RootMethod::Bisection => bisection(&mut eval, lower, upper, options),
    }
}

fn check_bracket(lower: f64, upper: f64, f_lower: f64, f_upper: f64) -> Result<()> {
    if f_lower.signum() == f_upper.signum() {
        return Err(RsmError::InvalidBracket {
            lower,
            upper,
            f_lower,
            f_upper,
        });
    }
    Ok(())
}

fn brent<F: FnMut(f64) -> Result<f64>>(
    eval: &mut Evaluator<'_, F>,
    xa: f64,
    xb: f64,
    opts: &RootOptions,
) -> Result<RootSolution> {
    let mut xpre = xa;
    let mut xcur = xb;
    let mut fpre = eval.eval(xpre)?;
    let mut fcur = eval.eval(xcur)?;

    if fpre == 0.0 {
        return Ok(RootSolution {
            root: xpre,
            iterations: 0,
            function_calls: eval.calls,
        });
    }
    if fcur == 0.0 {
        return Ok(RootSolution {
            root: xcur,
            iterations: 0,
            function_calls: eval.calls,
        });
    }
    check_bracket(xa, xb, fpre, fcur)?;

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for i in 0..opts.max_iterations {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (opts.xtol + opts.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(RootSolution {
                root: xcur,
                iterations: i + 1,
                function_calls: eval.calls,
            });
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // 割线插值
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // 逆二次插值
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };

            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = eval.eval(xcur)?;
    }

    Err(RsmError::RootNotConverged {
        iterations: opts.max_iterations,
        estimate: xcur,
    })
}

fn bisection<F: FnMut(f64) -> Result<f64>>(
    eval: &mut Evaluator<'_, F>,
    xa: f64,
    xb: f64,
    opts: &RootOptions,
) -> Result<RootSolution> {
    let fa = eval.eval(xa)?;
    let fb = eval.eval(xb)?;

    if fa == 0.0 {
        return Ok(RootSolution {
            root: xa,
            iterations: 0,
            function_calls: eval.calls,
        });
    }
    if fb == 0.0 {
        return Ok(RootSolution {
            root: xb,
            iterations: 0,
            function_calls: eval.calls,
        });
    }
    check_bracket(xa, xb, fa, fb)?;

    // 以 f(lower) 的符号为基准
    let (mut x_lo, mut dm) = if fa < 0.0 { (xa, xb - xa) } else { (xb, xa - xb) };
    let mut xm = x_lo;

    for i in 0..opts.max_iterations {
        dm *= 0.5;
        xm = x_lo + dm;
        let fm = eval.eval(xm)?;
        if fm <= 0.0 {
            x_lo = xm;
        }
        if fm == 0.0 || dm.abs() < opts.xtol + opts.rtol * xm.abs() {
            return Ok(RootSolution {
                root: xm,
                iterations: i + 1,
                function_calls: eval.calls,
            });
        }
    }

    Err(RsmError::RootNotConverged {
        iterations: opts.max_iterations,
        estimate: xm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> Result<f64> {
        Ok(x * x * x - 2.0 * x - 5.0)
    }

    const CUBIC_ROOT: f64 = 2.0945514815423265;

    #[test]
    fn test_brent_cubic() {
        let sol = find_root(RootMethod::Brent, cubic, 2.0, 3.0, &RootOptions::default(), None)
            .unwrap();
        assert!((sol.root - CUBIC_ROOT).abs() < 1e-11);
        assert!(sol.iterations < 20);
    }

    #[test]
    fn test_bisection_cubic() {
        let sol = find_root(
            RootMethod::Bisection,
            cubic,
            2.0,
            3.0,
            &RootOptions::default(),
            None,
        )
        .unwrap();
        assert!((sol.root - CUBIC_ROOT).abs() < 1e-11);
    }

    #[test]
    fn test_decreasing_function() {
        let f = |x: f64| Ok(0.3 - x);
        for method in [RootMethod::Brent, RootMethod::Bisection] {
            let sol = find_root(method, f, 0.0, 1.0, &RootOptions::default(), None).unwrap();
            assert!((sol.root - 0.3).abs() < 1e-11, "{}: {}", method, sol.root);
        }
    }

    #[test]
    fn test_root_at_endpoint() {
        let f = |x: f64| Ok(x - 1.0);
        let sol = find_root(RootMethod::Brent, f, 0.0, 1.0, &RootOptions::default(), None).unwrap();
        assert_eq!(sol.root, 1.0);
        assert_eq!(sol.iterations, 0);
    }

    #[test]
    fn test_no_sign_change() {
        let f = |x: f64| Ok(x * x + 1.0);
        for method in [RootMethod::Brent, RootMethod::Bisection] {
            let result = find_root(method, f, -1.0, 1.0, &RootOptions::default(), None);
            assert!(matches!(result, Err(RsmError::InvalidBracket { .. })));
        }
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let opts = RootOptions {
            max_iterations: 3,
            ..RootOptions::default()
        };
        let result = find_root(RootMethod::Bisection, cubic, 2.0, 3.0, &opts, None);
        assert!(matches!(
            result,
            Err(RsmError::RootNotConverged { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_residual() {
        // 第一次二分正好落在 0.5
        let f = |x: f64| if x == 0.5 { Ok(f64::NAN) } else { Ok(x - 0.7) };
        let result = find_root(
            RootMethod::Bisection,
            f,
            0.0,
            1.0,
            &RootOptions::default(),
            None,
        );
        assert!(matches!(result, Err(RsmError::DomainError(_))));
    }

    #[test]
    fn test_trace_callback() {
        let mut calls = Vec::new();
        let mut trace = |n: usize, x: f64, _fx: f64| calls.push((n, x));
        find_root(
            RootMethod::Brent,
            cubic,
            2.0,
            3.0,
            &RootOptions::default(),
            Some(&mut trace as &mut dyn FnMut(usize, f64, f64)),
        )
        .unwrap();
        assert_eq!(calls[0], (1, 2.0));
        assert_eq!(calls[1], (2, 3.0));
        assert!(calls.len() > 2);
    }

    #[test]
    fn test_method_names() {
        assert_eq!("brentq".parse::<RootMethod>().unwrap(), RootMethod::Brent);
        assert_eq!("bisect".parse::<RootMethod>().unwrap(), RootMethod::Bisection);
        assert!(matches!(
            "newton".parse::<RootMethod>(),
            Err(RsmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalid_interval() {
        let result = find_root(RootMethod::Brent, cubic, 3.0, 2.0, &RootOptions::default(), None);
        assert!(matches!(result, Err(RsmError::InvalidRange(_))));
    }
}
