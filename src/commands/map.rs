//! # map 子命令实现
//!
//! 扫描文件 → 实空间 (2θ–ω) 或倒空间 (Qx–Qy) 热图 / CSV。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行处理（rayon）
//! - 输出 PNG/SVG 热图或 CSV 长表
//!
//! ## 依赖关系
//! - 使用 `cli/map.rs` 定义的 MapArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `rsm/plot.rs`, `rsm/export.rs`

use super::common::{load_map, plot_options, LoadedMap};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::map::{MapArgs, MapOutputFormat};
use crate::error::{Result, RsmError};
use crate::rsm::export;
use crate::rsm::plot::{self, MapPlotOptions, PlotOverlay};
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 执行 map 子命令
pub fn execute(args: MapArgs) -> Result<()> {
    output::print_header("Reciprocal Space Map");

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(RsmError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &MapArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));

    let map = render(&args.input, &args.output, format, args)?;

    output::print_success(&format!(
        "Loaded scan '{}': {} x {} points, λ = {:.6} Å",
        map.scan.name,
        map.scan.rows(),
        map.scan.columns(),
        map.scan.wavelength
    ));
    output::print_written(
        &args.input.display().to_string(),
        &format!("{} ({} space)", args.output.display(), args.space),
    );
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &MapArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} scan files", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| RsmError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let format = args.format.unwrap_or(MapOutputFormat::Png);
    output::print_info(&format!("Output format: {:?}, {} space", format, args.space));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| process_batch_file(file, format, args));

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} files, {} success, {} skipped, {} failed",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));
    output::print_failures("Failed files:", &result.failures);

    Ok(())
}

/// 处理批量模式中的单个文件
fn process_batch_file(input: &Path, format: MapOutputFormat, args: &MapArgs) -> ProcessResult {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_file = args
        .output
        .join(format!("{}_{}.{}", stem, args.space, format.extension()));

    if output_file.exists() && !args.overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    match render(input, &output_file, format, args) {
        Ok(_) => {
            ProcessResult::Success(format!("{} -> {}", input.display(), output_file.display()))
        }
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 读取、变换并写出一个扫描
fn render(input: &Path, output: &Path, format: MapOutputFormat, args: &MapArgs) -> Result<LoadedMap> {
    let map = load_map(input, &args.transform, args.space)?;

    match format {
        MapOutputFormat::Csv => export::map_to_csv(
            &map.x,
            &map.y,
            &map.scan.intensity,
            (map.x_label, map.y_label),
            output,
        )?,
        MapOutputFormat::Png | MapOutputFormat::Svg => {
            let title = args.title.clone().unwrap_or_else(|| map.scan.name.clone());
            let options = MapPlotOptions {
                width: args.width,
                height: args.height,
                threshold: args.threshold,
                draw_border: args.border,
                use_svg: format == MapOutputFormat::Svg,
                ..plot_options(&args.style, &map, title)
            };
            plot::generate_map_plot(
                &map.x,
                &map.y,
                &map.scan.intensity,
                &PlotOverlay::default(),
                output,
                &options,
            )?;
        }
    }

    Ok(map)
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> MapOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => MapOutputFormat::Svg,
        Some("csv") | Some("txt") | Some("dat") => MapOutputFormat::Csv,
        _ => MapOutputFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format_from_extension(Path::new("a.SVG")), MapOutputFormat::Svg);
        assert_eq!(guess_format_from_extension(Path::new("a.csv")), MapOutputFormat::Csv);
        assert_eq!(guess_format_from_extension(Path::new("a.png")), MapOutputFormat::Png);
        assert_eq!(guess_format_from_extension(Path::new("noext")), MapOutputFormat::Png);
    }
}
