// src/sync/mod.rs

mod engine;

pub use engine::CourseSynchronizer;

use crate::{symbols, ui};
use colored::*;
use itertools::Itertools;
use log::info;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default, Debug)]
pub struct SyncStats {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// 同步引擎的共享状态管理器：按节点记录成功/失败/跳过，
/// 提交结束后汇总为呈现给作者的聚合报告。
#[derive(Clone)]
pub struct SyncManager {
    stats: Arc<Mutex<SyncStats>>,
    failed_nodes: Arc<Mutex<Vec<(String, String)>>>,
    skipped_nodes: Arc<Mutex<Vec<(String, String)>>>,
}

impl Default for SyncManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncManager {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(SyncStats::default())),
            failed_nodes: Arc::new(Mutex::new(Vec::new())),
            skipped_nodes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn start_batch(&self, total_nodes: usize) {
        info!("开始提交课程树，节点总数: {}", total_nodes);
        let mut stats = self.stats.lock().unwrap();
        *stats = SyncStats {
            total: total_nodes,
            ..Default::default()
        };
        self.failed_nodes.lock().unwrap().clear();
        self.skipped_nodes.lock().unwrap().clear();
    }

    pub fn record_success(&self) {
        self.stats.lock().unwrap().success += 1;
    }

    pub fn record_skip(&self, label: &str, reason: &str) {
        info!("跳过节点 '{}'，原因: {}", label, reason);
        self.stats.lock().unwrap().skipped += 1;
        self.skipped_nodes
            .lock()
            .unwrap()
            .push((label.to_string(), reason.to_string()));
    }

    pub fn record_failure(&self, label: &str, reason: &str) {
        log::error!("节点 '{}' 保存失败: {}", label, reason);
        self.stats.lock().unwrap().failed += 1;
        self.failed_nodes
            .lock()
            .unwrap()
            .push((label.to_string(), reason.to_string()));
    }

    pub fn get_stats(&self) -> SyncStats {
        self.stats.lock().unwrap().clone()
    }

    pub fn did_all_succeed(&self) -> bool {
        self.stats.lock().unwrap().failed == 0
    }

    pub fn snapshot(&self, course_id: Option<u64>) -> SyncReport {
        SyncReport {
            course_id,
            stats: self.get_stats(),
            failed: self.failed_nodes.lock().unwrap().clone(),
            skipped: self.skipped_nodes.lock().unwrap().clone(),
        }
    }

    /// 打印聚合报告：非阻塞的结果通知，失败与跳过按原因分组列出。
    pub fn print_report(&self) {
        let stats = self.get_stats();
        let skipped = self.skipped_nodes.lock().unwrap();
        let failed = self.failed_nodes.lock().unwrap();
        info!(
            "提交报告: Total={}, Success={}, Skipped={}, Failed={}",
            stats.total, stats.success, stats.skipped, stats.failed
        );

        if !skipped.is_empty() || !failed.is_empty() {
            ui::print_sub_header("提交详情报告");
            if !skipped.is_empty() {
                println!("\n{} 跳过的节点 ({}个):", *symbols::INFO, stats.skipped);
                print_grouped_report(&skipped, |s| s.cyan());
            }
            if !failed.is_empty() {
                println!("\n{} 失败的节点 ({}个):", *symbols::ERROR, stats.failed);
                print_grouped_report(&failed, |s| s.red());
            }
        }
        ui::print_sub_header("提交总结");
        if stats.failed == 0 && stats.skipped == 0 {
            println!("{} 全部 {} 个节点均已保存成功。", *symbols::OK, stats.total);
        } else {
            let summary = format!(
                "{} | {} | {}",
                format!("成功: {}", stats.success).green(),
                format!("失败: {}", stats.failed).red(),
                format!("跳过: {}", stats.skipped).yellow()
            );
            println!("{}", summary);
        }
    }
}

fn print_grouped_report(
    items: &[(String, String)],
    color_fn: fn(ColoredString) -> ColoredString,
) {
    let grouped = items
        .iter()
        .map(|(label, reason)| (reason.as_str(), label.as_str()))
        .into_group_map();
    for reason in grouped.keys().sorted() {
        println!("  - {}", color_fn(format!("原因: {}", reason).into()));
        for label in grouped[reason].iter().sorted() {
            println!("    - {}", crate::utils::truncate_text(label, 72));
        }
    }
}

/// 一次提交的最终结果。提交是尽力而为的：部分失败不会回滚已保存的
/// 兄弟节点，调用方应检查 failed/skipped 并提示作者重新提交失败项。
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub course_id: Option<u64>,
    pub stats: SyncStats,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.stats.failed == 0 && self.stats.skipped == 0
    }
}
