// src/ui.rs

use crate::{constants, symbols};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

/// 带边框的消息块，用于需要作者注意的多行通知。
pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn plain(msg: &str) {
    println!("{}", msg);
}

pub fn info(msg: &str) {
    println!("{} {}", *symbols::INFO, msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", *symbols::WARN, msg.yellow());
}

pub fn success(msg: &str) {
    println!("{} {}", *symbols::OK, msg.green());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", *symbols::ERROR, msg.red());
}

/// 按任务数计数的进度条。
pub fn new_tasks_progress_bar(total: u64, verb: &str) -> ProgressBar {
    let pbar = ProgressBar::new(total);
    pbar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    pbar.set_message(verb.to_string());
    pbar
}

/// 按字节数计量的进度条，所有文件大小已知时使用。
pub fn new_bytes_progress_bar(total_bytes: u64, verb: &str) -> ProgressBar {
    let pbar = ProgressBar::new(total_bytes);
    pbar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    pbar.set_message(verb.to_string());
    pbar
}
