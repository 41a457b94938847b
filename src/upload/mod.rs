// src/upload/mod.rs

mod task_runner;

pub use task_runner::execute_uploads;

use crate::{error::AppError, models::EntityId, symbols, utils};
use colored::*;
use dashmap::DashMap;
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// 上传目标的存储桶，区分课程资源、课时附件与课时正文文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    CourseResource,
    LessonResource,
    LessonContent,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        use crate::constants::api::upload_kinds;
        match self {
            UploadKind::CourseResource => upload_kinds::COURSE_RESOURCE,
            UploadKind::LessonResource => upload_kinds::LESSON_RESOURCE,
            UploadKind::LessonContent => upload_kinds::LESSON_CONTENT,
        }
    }
}

/// 一个待上传的文件任务。resource_id 指向树中的资源节点
/// （课时正文上传时指向课时本身）。
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub resource_id: EntityId,
    pub display_name: String,
    pub path: PathBuf,
    pub kind: UploadKind,
    pub size: Option<u64>,
}

impl UploadTask {
    pub fn from_path(resource_id: EntityId, kind: UploadKind, path: &Path) -> Self {
        let display_name = path
            .file_name()
            .map(|n| utils::sanitize_filename(&n.to_string_lossy()))
            .unwrap_or_else(|| "unnamed".to_string());
        let size = fs::metadata(path).ok().map(|m| m.len());
        Self {
            resource_id,
            display_name,
            path: path.to_path_buf(),
            kind,
            size,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UploadStatus {
    Success,
    Skipped,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    TokenError,
    IoError,
    UnexpectedError,
}

impl UploadStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            UploadStatus::Success => (&symbols::OK, |s| s.green(), "上传成功"),
            UploadStatus::Skipped => (&symbols::INFO, |s| s.cyan(), "此前已上传，跳过"),
            UploadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            UploadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            UploadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            UploadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            UploadStatus::TokenError => (&symbols::ERROR, |s| s.red(), "认证失败 (Token无效)"),
            UploadStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读取错误"),
            UploadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }
}

impl From<&AppError> for UploadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::TokenInvalid | AppError::TokenMissing => UploadStatus::TokenError,
            AppError::Network(err)
            | AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(err)) => {
                if err.is_timeout() {
                    UploadStatus::TimeoutError
                } else if err.is_connect() {
                    UploadStatus::ConnectionError
                } else if err.is_status() {
                    UploadStatus::HttpError
                } else {
                    UploadStatus::NetworkError
                }
            }
            AppError::NetworkMiddleware(_) => UploadStatus::NetworkError,
            AppError::Io(_) => UploadStatus::IoError,
            _ => UploadStatus::UnexpectedError,
        }
    }
}

/// 单个文件的上传结果。失败互相隔离，成功的文件携带持久化 URL。
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub resource_id: EntityId,
    pub display_name: String,
    pub status: UploadStatus,
    pub file_url: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Default, Debug)]
pub struct UploadStats {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// 上传管线的共享状态：批次统计、失败清单，以及按源文件路径缓存的
/// 已解析 URL。重试一批文件时，已成功的文件直接命中缓存跳过。
#[derive(Clone)]
pub struct UploadManager {
    stats: Arc<Mutex<UploadStats>>,
    failed_uploads: Arc<Mutex<Vec<(String, String)>>>,
    resolved: Arc<DashMap<PathBuf, String>>,
}

impl Default for UploadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadManager {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(UploadStats::default())),
            failed_uploads: Arc::new(Mutex::new(Vec::new())),
            resolved: Arc::new(DashMap::new()),
        }
    }

    pub fn start_batch(&self, total_tasks: usize) {
        info!("开始新一批上传任务，总数: {}", total_tasks);
        let mut stats = self.stats.lock().unwrap();
        *stats = UploadStats {
            total: total_tasks,
            ..Default::default()
        };
        self.failed_uploads.lock().unwrap().clear();
    }

    pub fn record_success(&self, path: &Path, url: &str) {
        self.stats.lock().unwrap().success += 1;
        self.resolved.insert(path.to_path_buf(), url.to_string());
    }

    pub fn record_skip(&self) {
        self.stats.lock().unwrap().skipped += 1;
    }

    pub fn record_failure(&self, filename: &str, status: UploadStatus) {
        log::error!("文件 '{}' 上传失败，状态: {:?}", filename, status);
        self.stats.lock().unwrap().failed += 1;
        let (_, _, msg) = status.get_display_info();
        self.failed_uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), msg.to_string()));
    }

    /// 此前批次已解析出的 URL（按源文件路径）。
    pub fn resolved_url(&self, path: &Path) -> Option<String> {
        self.resolved.get(path).map(|entry| entry.value().clone())
    }

    pub fn get_stats(&self) -> UploadStats {
        self.stats.lock().unwrap().clone()
    }

    pub fn did_all_succeed(&self) -> bool {
        self.stats.lock().unwrap().failed == 0
    }
}
