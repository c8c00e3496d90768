//! # rsmkit - 外延纤锌矿合金倒空间图分析工具
//!
//! 从 XRD 倒空间图 (RSM) 的非对称反射峰位求三元合金组分与应变弛豫度。
//!
//! ## 子命令
//! - `map`    - 扫描文件转换为实空间/倒空间热图或 CSV
//! - `peaks`  - 峰位检测
//! - `solve`  - 组分与应变弛豫求解
//! - `theory` - 合金参数与理论峰位
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (扫描文件解析)
//!   │     ├── rsm/       (数值核心、绘图、导出)
//!   │     ├── batch/     (并行批处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod rsm;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
