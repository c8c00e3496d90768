//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `map`: 扫描文件 → 实空间/倒空间热图或 CSV（支持批量）
//! - `peaks`: 峰位检测
//! - `solve`: 组分与应变弛豫求解
//! - `theory`: 合金参数与理论峰位
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: common, map, peaks, solve, theory

pub mod common;
pub mod map;
pub mod peaks;
pub mod solve;
pub mod theory;

use clap::{Parser, Subcommand};

/// rsmkit - 外延氮化物薄膜倒空间图分析
#[derive(Parser)]
#[command(name = "rsmkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Reciprocal space map analysis of epitaxial wurtzite alloys", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert scan files to real/reciprocal space maps (PNG, SVG or CSV)
    Map(map::MapArgs),

    /// Detect intensity peaks in a scan
    Peaks(peaks::PeaksArgs),

    /// Solve alloy composition and strain relaxation of measured peaks
    Solve(solve::SolveArgs),

    /// Print alloy parameters and theoretical peak positions
    Theory(theory::TheoryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Hkl, ReciprocalPoint};

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve_point() {
        let cli = Cli::try_parse_from([
            "rsmkit",
            "solve",
            "--point",
            "3550,9400",
            "--alloy",
            "InGaN",
            "--hkl",
            "1,1,4",
            "--bowing",
            "0,-0.1,0,0",
        ])
        .unwrap();
        match cli.command {
            Commands::Solve(args) => {
                assert_eq!(args.point, vec![ReciprocalPoint::new(3550.0, 9400.0)]);
                assert_eq!(args.alloy.hkl, Hkl::new(1, 1, 4));
                assert_eq!(args.alloy.bowing.lattice_c, -0.1);
                assert_eq!(args.max_iter, 100);
            }
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn test_solve_requires_point_or_input() {
        assert!(Cli::try_parse_from(["rsmkit", "solve", "--alloy", "InGaN"]).is_err());
    }

    #[test]
    fn test_alloy_conflicts_with_binaries() {
        assert!(Cli::try_parse_from([
            "rsmkit",
            "theory",
            "--alloy",
            "InGaN",
            "--binary-a",
            "InN",
            "--binary-b",
            "GaN"
        ])
        .is_err());
    }

    #[test]
    fn test_theory_compositions() {
        let cli = Cli::try_parse_from(["rsmkit", "theory", "-t", "0.1,0.2"]).unwrap();
        match cli.command {
            Commands::Theory(args) => assert_eq!(args.composition, vec![0.1, 0.2]),
            _ => panic!("expected theory"),
        }
    }

    #[test]
    fn test_map_plot_style() {
        let cli = Cli::try_parse_from([
            "rsmkit",
            "map",
            "scan.xrdml",
            "--color-scale",
            "log",
            "--x-range",
            "-1500,-900",
            "--v-range",
            "10,1e5",
            "--colorbar",
            "--colorbar-label",
            "counts",
            "--contours",
            "6",
        ])
        .unwrap();
        match cli.command {
            Commands::Map(args) => {
                assert_eq!(args.style.x_range, Some((-1500.0, -900.0)));
                assert_eq!(args.style.y_range, None);
                assert_eq!(args.style.v_range, Some((10.0, 1e5)));
                assert!(args.style.colorbar);
                assert_eq!(args.style.colorbar_label.as_deref(), Some("counts"));
                assert_eq!(args.style.contours, 6);
            }
            _ => panic!("expected map"),
        }
    }

    #[test]
    fn test_plot_style_validation() {
        assert!(Cli::try_parse_from(["rsmkit", "map", "scan.xrdml", "--v-range", "5,1"]).is_err());
        assert!(Cli::try_parse_from([
            "rsmkit",
            "solve",
            "--input",
            "scan.xrdml",
            "--colorbar-label",
            "counts"
        ])
        .is_err());
    }
}
