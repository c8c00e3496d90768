//! # 美化输出工具
//!
//! 提供统一的终端输出样式。数值核心（`rsm/`）不调用这里的任何函数。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 失败列表最多显示的条数
const MAX_LISTED_FAILURES: usize = 10;

pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印输入 → 输出文件
pub fn print_written(from: &str, to: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to
    );
}

/// 打印对齐的 键: 值
pub fn print_key_value(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key).bold(), value);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 打印失败列表（名称, 错误），超过上限时只显示前几条
pub fn print_failures(title: &str, failures: &[(String, String)]) {
    if failures.is_empty() {
        return;
    }
    print_warning(title);
    for (name, err) in failures.iter().take(MAX_LISTED_FAILURES) {
        print_error(&format!("  {}: {}", name, err));
    }
    if failures.len() > MAX_LISTED_FAILURES {
        print_warning(&format!(
            "  ... and {} more",
            failures.len() - MAX_LISTED_FAILURES
        ));
    }
}
