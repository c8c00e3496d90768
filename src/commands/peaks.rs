//! # peaks 子命令实现
//!
//! 在实空间或倒空间图上检测强度峰，打印表格并可导出 CSV；
//! 平滑后的图像也可以单独导出。
//!
//! ## 依赖关系
//! - 使用 `cli/peaks.rs` 定义的 PeaksArgs
//! - 使用 `rsm/peaks.rs`, `rsm/export.rs`

use super::common::load_map;
use crate::cli::common::DetectArgs;
use crate::cli::peaks::PeaksArgs;
use crate::error::Result;
use crate::models::Grid2;
use crate::rsm::export;
use crate::rsm::peaks::{DetectedPeak, PeakDetector, PeakSearch};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 执行 peaks 子命令
pub fn execute(args: PeaksArgs) -> Result<()> {
    output::print_header("Peak Detection");

    let map = load_map(&args.input, &args.transform, args.space)?;
    output::print_success(&format!(
        "Loaded scan '{}': {} x {} points",
        map.scan.name,
        map.scan.rows(),
        map.scan.columns()
    ));

    let search = detect_peaks(&map.x, &map.y, &map.scan.intensity, &args.detect)?;

    if let Some(path) = &args.filtered {
        export::map_to_csv(
            &map.x,
            &map.y,
            &search.filtered,
            (map.x_label, map.y_label),
            path,
        )?;
        output::print_written(&map.scan.name, &path.display().to_string());
    }

    let peaks = search.peaks;
    if peaks.is_empty() {
        output::print_warning("No peaks found");
        return Ok(());
    }

    print_peak_table(&peaks, map.x_label, map.y_label);

    if let Some(path) = &args.output {
        export::peaks_to_csv(&peaks, path)?;
        output::print_success(&format!("Peaks saved to '{}'", path.display()));
    }

    Ok(())
}

/// 按参数检测峰并截取最强的 N 个
pub fn detect_peaks(
    x: &Grid2,
    y: &Grid2,
    intensity: &Grid2,
    args: &DetectArgs,
) -> Result<PeakSearch> {
    let mut detector = PeakDetector::new();
    if let Some(sigma) = args.sigma {
        detector = detector.with_gaussian(sigma);
    }
    if let Some(threshold) = args.threshold {
        detector = detector.with_threshold(threshold);
    }

    let mut search = detector.find_peaks(x, y, intensity)?;
    if args.top > 0 {
        search.peaks.truncate(args.top);
    }
    Ok(search)
}

/// 打印峰位表格
fn print_peak_table(peaks: &[DetectedPeak], x_label: &str, y_label: &str) {
    #[derive(Tabled)]
    struct PeakRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "x")]
        x: String,
        #[tabled(rename = "y")]
        y: String,
        #[tabled(rename = "Intensity")]
        intensity: String,
        #[tabled(rename = "(row, col)")]
        pixel: String,
    }

    let rows: Vec<PeakRow> = peaks
        .iter()
        .enumerate()
        .map(|(i, p)| PeakRow {
            index: i + 1,
            x: format!("{:.4}", p.x),
            y: format!("{:.4}", p.y),
            intensity: format!("{:.1}", p.z),
            pixel: format!("({}, {})", p.row, p.col),
        })
        .collect();

    output::print_header(&format!(
        "{} Peaks (x = {}, y = {})",
        rows.len(),
        x_label,
        y_label
    ));
    println!("{}", Table::new(&rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsm::peaks::gaussian_filter;

    #[test]
    fn test_detect_peaks_keeps_smoothed_map() {
        let mut image = Grid2::filled(9, 9, 0.0);
        image.set(2, 2, 50.0);
        image.set(6, 6, 80.0);
        let x = image.map(|_| 0.0);
        let y = image.map(|_| 0.0);
        let args = DetectArgs {
            sigma: Some(1.0),
            threshold: None,
            top: 1,
        };

        let search = detect_peaks(&x, &y, &image, &args).unwrap();
        assert_eq!(search.peaks.len(), 1);
        assert_eq!((search.peaks[0].row, search.peaks[0].col), (6, 6));
        assert_eq!(search.filtered, gaussian_filter(&image, 1.0));

        let wtr = export::write_map(
            csv::Writer::from_writer(Vec::new()),
            &x,
            &y,
            &search.filtered,
            ("qx", "qy"),
        )
        .unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().count(), 82);
    }
}
