//! # theory 子命令实现
//!
//! 打印给定组分处的合金参数和理论峰位；可选地把 (Qx, Qy) 反算成 (a, c)。
//!
//! ## 依赖关系
//! - 使用 `cli/theory.rs` 定义的 TheoryArgs
//! - 使用 `rsm/solver.rs`, `rsm/reciprocal.rs`

use super::common::{load_alloy, solver_config};
use crate::cli::theory::TheoryArgs;
use crate::error::{Result, RsmError};
use crate::rsm::reciprocal;
use crate::rsm::solver::StrainSolver;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TheoryRow {
    #[tabled(rename = "t")]
    composition: String,
    #[tabled(rename = "a (Å)")]
    a: String,
    #[tabled(rename = "c (Å)")]
    c: String,
    #[tabled(rename = "C13")]
    c13: String,
    #[tabled(rename = "C33")]
    c33: String,
    #[tabled(rename = "D")]
    d: String,
    #[tabled(rename = "Qx")]
    qx: String,
    #[tabled(rename = "Qy")]
    qy: String,
}

/// 执行 theory 子命令
pub fn execute(args: TheoryArgs) -> Result<()> {
    output::print_header("Theoretical Peak Positions");

    let (alloy_name, params) = load_alloy(&args.alloy)?;
    let config = solver_config(&args.alloy);
    let solver = StrainSolver::new(params, config);

    output::print_key_value("Alloy", &alloy_name);
    output::print_key_value("Reflection", &config.hkl.to_string());
    output::print_key_value("Structure", &config.structure.to_string());
    output::print_key_value(
        "Scale / shift",
        &format!(
            "({}, {}) / ({}, {})",
            config.scale.x, config.scale.y, config.shift.x, config.shift.y
        ),
    );

    let mut rows = Vec::with_capacity(args.composition.len());
    for &t in &args.composition {
        if !(0.0..=1.0).contains(&t) {
            return Err(RsmError::InvalidRange(format!(
                "composition {} (must be within [0, 1])",
                t
            )));
        }
        let (set, point) = solver.displayed_peak(t)?;
        rows.push(TheoryRow {
            composition: format!("{:.4}", t),
            a: format!("{:.5}", set.a),
            c: format!("{:.5}", set.c),
            c13: format!("{:.2}", set.c13),
            c33: format!("{:.2}", set.c33),
            d: format!("{:.5}", set.d),
            qx: format!("{:.3}", point.qx),
            qy: format!("{:.3}", point.qy),
        });
    }

    if !rows.is_empty() {
        println!();
        println!("{}", Table::new(&rows));
    }

    if let Some(point) = args.point {
        let (a, c) = reciprocal::lattice_from_qxy(
            point,
            config.hkl,
            config.structure,
            config.scale,
            config.shift,
        )?;
        output::print_separator();
        output::print_success(&format!(
            "{} corresponds to a = {:.5} Å, c = {:.5} Å",
            point, a, c
        ));
    }

    Ok(())
}
