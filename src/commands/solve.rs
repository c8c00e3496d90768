//! # solve 子命令实现
//!
//! 对一个或多个测量峰求解合金组分和应变弛豫。
//!
//! ## 功能
//! - 测量点来自命令行或扫描文件的峰位检测
//! - 每个峰独立并行求解，失败的峰报告后跳过
//! - 结果表格、CSV 导出、带弛豫线的热图
//!
//! ## 依赖关系
//! - 使用 `cli/solve.rs` 定义的 SolveArgs
//! - 使用 `rsm/solver.rs`, `rsm/peaks.rs`, `rsm/plot.rs`, `rsm/export.rs`
//! - 使用 `batch/runner.rs` 并行求解

use super::common::{load_alloy, load_map, plot_options, solver_config, LoadedMap};
use super::peaks::detect_peaks;
use crate::batch::BatchRunner;
use crate::cli::common::{PlotArgs, Space};
use crate::cli::solve::SolveArgs;
use crate::error::{Result, RsmError};
use crate::models::{ReciprocalPoint, SolutionResult};
use crate::rsm::export::{self, SolvedPeak};
use crate::rsm::plot::{self, MapPlotOptions, PlotOverlay};
use crate::rsm::roots::RootOptions;
use crate::rsm::solver::{SolveObserver, SolverConfig, StrainSolver};
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 待求解的测量峰
#[derive(Debug, Clone, Copy)]
struct MeasuredPeak {
    position: ReciprocalPoint,
    intensity: Option<f64>,
}

/// 把求根过程打印到终端
struct ConsoleObserver;

impl SolveObserver for ConsoleObserver {
    fn on_evaluation(&self, call: usize, composition: f64, residual: f64) {
        println!(
            "    f(t = {:.10}) = {:+.6e}  [call {}]",
            composition, residual, call
        );
    }

    fn on_solution(&self, measured: &ReciprocalPoint, result: &SolutionResult) {
        output::print_info(&format!(
            "{} -> t = {:.6}, R = {:.2}% ({} iterations)",
            measured, result.composition, result.relaxation_percent, result.iterations
        ));
    }
}

/// 执行 solve 子命令
pub fn execute(args: SolveArgs) -> Result<()> {
    output::print_header("Composition & Strain Relaxation");

    let (alloy_name, params) = load_alloy(&args.alloy)?;
    let config = build_config(&args);
    output::print_info(&format!(
        "Alloy {} ({} {}), reflection {}, {} root finding",
        alloy_name, config.structure, config.alloy_type, config.hkl, config.method
    ));

    let observer = ConsoleObserver;
    let solver = if args.verbose {
        StrainSolver::new(params, config).with_observer(&observer)
    } else {
        StrainSolver::new(params, config)
    };

    let reference = match args.reference {
        Some(point) => point,
        None => {
            let (_, point) = solver.theoretical_peak(0.0)?;
            output::print_info(&format!(
                "No --reference given, using relaxed endpoint B at {}",
                point
            ));
            point
        }
    };

    let (peaks, map) = match &args.input {
        Some(path) => {
            let map = load_map(path, &args.transform, Space::Reciprocal)?;
            let detected = detect_peaks(&map.x, &map.y, &map.scan.intensity, &args.detect)?.peaks;
            output::print_success(&format!(
                "Detected {} peaks in '{}'",
                detected.len(),
                map.scan.name
            ));
            let peaks: Vec<MeasuredPeak> = detected
                .iter()
                .map(|p| MeasuredPeak {
                    position: p.position(),
                    intensity: Some(p.z),
                })
                .collect();
            (peaks, Some(map))
        }
        None => {
            let peaks: Vec<MeasuredPeak> = args
                .point
                .iter()
                .map(|&position| MeasuredPeak {
                    position,
                    intensity: None,
                })
                .collect();
            (peaks, None)
        }
    };

    if peaks.is_empty() {
        output::print_warning("Nothing to solve");
        return Ok(());
    }

    // 每个峰独立求解
    let runner = if args.verbose {
        BatchRunner::new(1).quiet()
    } else {
        BatchRunner::new(args.jobs).quiet()
    };
    let results = runner.map(&peaks, |peak| solver.solve(peak.position, reference));

    let mut solved = Vec::new();
    let mut failures = Vec::new();
    for (peak, result) in peaks.iter().zip(results) {
        match result {
            Ok(result) => solved.push(SolvedPeak {
                measured: peak.position,
                intensity: peak.intensity,
                result,
            }),
            Err(e) if peaks.len() == 1 => return Err(e),
            Err(e) => failures.push((peak.position.to_string(), e.to_string())),
        }
    }

    print_solution_table(&solved, &alloy_name, reference);
    output::print_failures("Peaks that could not be solved:", &failures);

    if solved.is_empty() {
        return Err(RsmError::Other(format!(
            "none of the {} peaks could be solved",
            peaks.len()
        )));
    }

    if let Some(path) = &args.output_csv {
        export::solutions_to_csv(&solved, path)?;
        output::print_success(&format!("Solutions saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot {
        match &map {
            Some(map) => {
                plot_solutions(map, &args.style, &solved, reference, path)?;
                output::print_success(&format!("Plot saved to '{}'", path.display()));
            }
            None => output::print_warning("--plot needs --input; skipping plot"),
        }
    }

    Ok(())
}

/// 由命令行参数构建求解配置
fn build_config(args: &SolveArgs) -> SolverConfig {
    SolverConfig {
        interval: (args.interval.x, args.interval.y),
        method: args.method,
        options: RootOptions {
            xtol: args.xtol,
            rtol: args.rtol,
            max_iterations: args.max_iter,
        },
        ..solver_config(&args.alloy)
    }
}

fn plot_solutions(
    map: &LoadedMap,
    style: &PlotArgs,
    solved: &[SolvedPeak],
    reference: ReciprocalPoint,
    path: &Path,
) -> Result<()> {
    let mut overlay = PlotOverlay::from_solutions(solved);
    overlay.markers.push(reference);

    let use_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    let options = MapPlotOptions {
        draw_border: true,
        use_svg,
        ..plot_options(style, map, map.scan.name.clone())
    };

    plot::generate_map_plot(
        &map.x,
        &map.y,
        &map.scan.intensity,
        &overlay,
        path,
        &options,
    )
}

/// 打印求解结果表格
fn print_solution_table(solved: &[SolvedPeak], alloy_name: &str, reference: ReciprocalPoint) {
    #[derive(Tabled)]
    struct SolutionRow {
        #[tabled(rename = "(Qx, Qy)")]
        measured: String,
        #[tabled(rename = "Intensity")]
        intensity: String,
        #[tabled(rename = "t")]
        composition: String,
        #[tabled(rename = "R (%)")]
        relaxation: String,
        #[tabled(rename = "a (Å)")]
        a: String,
        #[tabled(rename = "c (Å)")]
        c: String,
        #[tabled(rename = "D")]
        d: String,
        #[tabled(rename = "Iter")]
        iterations: usize,
    }

    if solved.is_empty() {
        return;
    }

    let rows: Vec<SolutionRow> = solved
        .iter()
        .map(|s| SolutionRow {
            measured: s.measured.to_string(),
            intensity: s
                .intensity
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string()),
            composition: format!("{:.4}", s.result.composition),
            relaxation: format!("{:.2}", s.result.relaxation_percent),
            a: format!("{:.4}", s.result.alloy.a),
            c: format!("{:.4}", s.result.alloy.c),
            d: format!("{:.4}", s.result.alloy.d),
            iterations: s.result.iterations,
        })
        .collect();

    output::print_header(&format!(
        "{} solutions ({}, reference {})",
        rows.len(),
        alloy_name,
        reference
    ));
    println!("{}", Table::new(&rows));
}
