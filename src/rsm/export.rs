//! # 数据导出
//!
//! ## 支持格式
//! - 强度图 CSV：长表格式 `x, y, intensity`，每个像素一行
//! - 峰位 CSV：`row, col, x, y, intensity`
//! - 求解结果 CSV：测量点、组分、弛豫及无应变/完全应变点
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/peaks.rs`, `commands/solve.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, RsmError};
use crate::models::{Grid2, ReciprocalPoint, SolutionResult};
use crate::rsm::peaks::DetectedPeak;

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 一个已求解的峰
#[derive(Debug, Clone, Copy)]
pub struct SolvedPeak {
    pub measured: ReciprocalPoint,
    pub intensity: Option<f64>,
    pub result: SolutionResult,
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| RsmError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

fn finish<W: Write>(mut wtr: csv::Writer<W>, path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| RsmError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 导出强度图（长表）
pub fn map_to_csv(
    x: &Grid2,
    y: &Grid2,
    intensity: &Grid2,
    headers: (&str, &str),
    output_path: &Path,
) -> Result<()> {
    let wtr = csv::Writer::from_writer(create_file(output_path)?);
    let wtr = write_map(wtr, x, y, intensity, headers)?;
    finish(wtr, output_path)
}

/// 写入强度图到任意 writer
pub fn write_map<W: Write>(
    mut wtr: csv::Writer<W>,
    x: &Grid2,
    y: &Grid2,
    intensity: &Grid2,
    headers: (&str, &str),
) -> Result<csv::Writer<W>> {
    if x.shape() != intensity.shape() || y.shape() != intensity.shape() {
        return Err(RsmError::InvalidArgument(format!(
            "coordinate grids {:?}/{:?} do not match intensity grid {:?}",
            x.shape(),
            y.shape(),
            intensity.shape()
        )));
    }

    wtr.write_record([headers.0, headers.1, "intensity"])?;

    for (r, c, value) in intensity.indexed_iter() {
        wtr.write_record(&[
            format!("{:.6}", x.get(r, c)),
            format!("{:.6}", y.get(r, c)),
            format!("{}", value),
        ])?;
    }

    Ok(wtr)
}

/// 导出峰位
pub fn peaks_to_csv(peaks: &[DetectedPeak], output_path: &Path) -> Result<()> {
    let wtr = csv::Writer::from_writer(create_file(output_path)?);
    let wtr = write_peaks(wtr, peaks)?;
    finish(wtr, output_path)
}

pub fn write_peaks<W: Write>(
    mut wtr: csv::Writer<W>,
    peaks: &[DetectedPeak],
) -> Result<csv::Writer<W>> {
    wtr.write_record(["row", "col", "x", "y", "intensity"])?;
    for peak in peaks {
        wtr.write_record(&[
            peak.row.to_string(),
            peak.col.to_string(),
            format!("{:.6}", peak.x),
            format!("{:.6}", peak.y),
            format!("{}", peak.z),
        ])?;
    }
    Ok(wtr)
}

/// 导出求解结果
pub fn solutions_to_csv(solutions: &[SolvedPeak], output_path: &Path) -> Result<()> {
    let wtr = csv::Writer::from_writer(create_file(output_path)?);
    let wtr = write_solutions(wtr, solutions)?;
    finish(wtr, output_path)
}

pub fn write_solutions<W: Write>(
    mut wtr: csv::Writer<W>,
    solutions: &[SolvedPeak],
) -> Result<csv::Writer<W>> {
    wtr.write_record([
        "qx",
        "qy",
        "intensity",
        "composition",
        "relaxation_percent",
        "iterations",
        "a",
        "c",
        "d",
        "no_strain_qx",
        "no_strain_qy",
        "full_strain_qx",
        "full_strain_qy",
    ])?;

    for s in solutions {
        let r = &s.result;
        wtr.write_record(&[
            format!("{:.6}", s.measured.qx),
            format!("{:.6}", s.measured.qy),
            s.intensity.map(|v| v.to_string()).unwrap_or_default(),
            format!("{:.8}", r.composition),
            format!("{:.4}", r.relaxation_percent),
            r.iterations.to_string(),
            format!("{:.6}", r.alloy.a),
            format!("{:.6}", r.alloy.c),
            format!("{:.6}", r.alloy.d),
            format!("{:.6}", r.no_strain_point.qx),
            format!("{:.6}", r.no_strain_point.qy),
            format!("{:.6}", r.full_strain_point.qx),
            format!("{:.6}", r.full_strain_point.qy),
        ])?;
    }

    Ok(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlloyParameterSet;

    fn into_string(wtr: csv::Writer<Vec<u8>>) -> String {
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_write_map_long_format() {
        let x = Grid2::new(1, 2, vec![1.0, 2.0]).unwrap();
        let y = Grid2::new(1, 2, vec![10.0, 20.0]).unwrap();
        let z = Grid2::new(1, 2, vec![5.0, 7.5]).unwrap();

        let wtr = write_map(csv::Writer::from_writer(Vec::new()), &x, &y, &z, ("qx", "qy")).unwrap();
        let text = into_string(wtr);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "qx,qy,intensity");
        assert_eq!(lines[1], "1.000000,10.000000,5");
        assert_eq!(lines[2], "2.000000,20.000000,7.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_map_shape_mismatch() {
        let x = Grid2::filled(1, 2, 0.0);
        let z = Grid2::filled(2, 2, 0.0);
        assert!(write_map(csv::Writer::from_writer(Vec::new()), &x, &x, &z, ("a", "b")).is_err());
    }

    #[test]
    fn test_write_peaks() {
        let peaks = [DetectedPeak {
            row: 3,
            col: 4,
            x: 1.5,
            y: 2.5,
            z: 100.0,
        }];
        let text = into_string(write_peaks(csv::Writer::from_writer(Vec::new()), &peaks).unwrap());
        assert_eq!(
            text,
            "row,col,x,y,intensity\n3,4,1.500000,2.500000,100\n"
        );
    }

    #[test]
    fn test_write_solutions() {
        let result = SolutionResult {
            composition: 0.2,
            relaxation_percent: 42.0,
            converged: true,
            iterations: 7,
            alloy: AlloyParameterSet {
                a: 3.26,
                c: 5.29,
                c13: 103.0,
                c33: 363.0,
                d: -0.567,
            },
            no_strain_point: ReciprocalPoint::new(3500.0, 9400.0),
            full_strain_point: ReciprocalPoint::new(3600.0, 9350.0),
        };
        let rows = [SolvedPeak {
            measured: ReciprocalPoint::new(3550.0, 9380.0),
            intensity: None,
            result,
        }];
        let text =
            into_string(write_solutions(csv::Writer::from_writer(Vec::new()), &rows).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("qx,qy,intensity,composition"));
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[2], "");
        assert_eq!(fields[3], "0.20000000");
        assert_eq!(fields[4], "42.0000");
        assert_eq!(fields[5], "7");
    }
}
