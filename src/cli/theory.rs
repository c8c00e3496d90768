//! # theory 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/theory.rs`

use super::common::AlloyArgs;
use crate::models::ReciprocalPoint;

use clap::Args;

/// theory 子命令参数
#[derive(Args, Debug)]
pub struct TheoryArgs {
    /// Compositions to evaluate (fraction of endpoint A)
    #[arg(short = 't', long, value_delimiter = ',', default_value = "0,0.25,0.5,0.75,1")]
    pub composition: Vec<f64>,

    /// Also convert this "qx,qy" back to lattice constants (a, c)
    #[arg(long, allow_hyphen_values = true)]
    pub point: Option<ReciprocalPoint>,

    #[command(flatten)]
    pub alloy: AlloyArgs,
}
