// src/upload/task_runner.rs

use super::{UploadOutcome, UploadStatus, UploadTask};
use crate::{AuthorJobContext, error::*, remote::CourseApi, ui};
use futures::{StreamExt, stream};
use indicatif::{HumanBytes, ProgressBar};
use log::error;
use std::{
    cmp::min,
    sync::{Arc, Mutex},
};

/// 执行一批上传任务，管理并发和进度报告。
/// 每个文件独立上传，单个文件失败不影响其余文件；
/// 唯一的例外是 Token 失效，这会中止整个批次（后续请求必然同样失败）。
pub async fn execute_uploads(
    context: &AuthorJobContext,
    api: Arc<dyn CourseApi>,
    tasks: Vec<UploadTask>,
) -> AppResult<Vec<UploadOutcome>> {
    let max_workers = min(context.config.max_workers, tasks.len());
    if max_workers == 0 {
        return Ok(vec![]);
    }
    context.uploads.start_batch(tasks.len());

    let all_sizes_available = tasks.iter().all(|t| t.size.is_some_and(|s| s > 0));
    let main_pbar = setup_progress_bar(&tasks, max_workers, all_sizes_available);

    let outcomes = Arc::new(Mutex::new(Vec::with_capacity(tasks.len())));
    let fatal_error = Arc::new(tokio::sync::Mutex::new(None::<AppError>));

    stream::iter(tasks)
        .for_each_concurrent(max_workers, |task| {
            run_single_concurrent_task(
                task,
                context.clone(),
                api.clone(),
                main_pbar.clone(),
                outcomes.clone(),
                fatal_error.clone(),
                all_sizes_available,
            )
        })
        .await;

    main_pbar.finish_and_clear();
    if let Some(err) = fatal_error.lock().await.take() {
        return Err(err);
    }
    let outcomes = Arc::try_unwrap(outcomes)
        .map(|m| m.into_inner().unwrap())
        .unwrap_or_default();
    Ok(outcomes)
}

/// 在并发池中运行的单个上传单元。
#[allow(clippy::too_many_arguments)]
async fn run_single_concurrent_task(
    task: UploadTask,
    context: AuthorJobContext,
    api: Arc<dyn CourseApi>,
    main_pbar: ProgressBar,
    outcomes: Arc<Mutex<Vec<UploadOutcome>>>,
    fatal_error: Arc<tokio::sync::Mutex<Option<AppError>>>,
    use_byte_progress: bool,
) {
    if fatal_error.lock().await.is_some() {
        return;
    }

    // 命中缓存的文件直接复用此前解析出的 URL
    if let Some(url) = context.uploads.resolved_url(&task.path) {
        context.uploads.record_skip();
        outcomes.lock().unwrap().push(UploadOutcome {
            resource_id: task.resource_id.clone(),
            display_name: task.display_name.clone(),
            status: UploadStatus::Skipped,
            file_url: Some(url),
            message: None,
        });
        advance_progress(&main_pbar, &task, use_byte_progress);
        return;
    }

    match api.upload_file(&task).await {
        Ok(url) => {
            context.uploads.record_success(&task.path, &url);
            main_pbar.println(format!("{} {}", *crate::symbols::OK, task.display_name));
            outcomes.lock().unwrap().push(UploadOutcome {
                resource_id: task.resource_id.clone(),
                display_name: task.display_name.clone(),
                status: UploadStatus::Success,
                file_url: Some(url),
                message: None,
            });
        }
        // Token 失效是致命错误，标记后中止整个批次
        Err(e @ AppError::TokenInvalid) => {
            let mut error_lock = fatal_error.lock().await;
            if error_lock.is_none() {
                error!(
                    "文件 '{}' 因 Token 失效上传失败，将中止整个批次。",
                    task.display_name
                );
                context
                    .uploads
                    .record_failure(&task.display_name, UploadStatus::TokenError);
                *error_lock = Some(e);
            }
        }
        Err(e) => {
            let status = UploadStatus::from(&e);
            context.uploads.record_failure(&task.display_name, status);
            let (symbol, color_fn, default_msg) = status.get_display_info();
            main_pbar.println(format!(
                "\n{} {} {}",
                symbol,
                task.display_name,
                color_fn(format!("失败: {} (详情: {})", default_msg, e).into())
            ));
            outcomes.lock().unwrap().push(UploadOutcome {
                resource_id: task.resource_id.clone(),
                display_name: task.display_name.clone(),
                status,
                file_url: None,
                message: Some(e.to_string()),
            });
        }
    }
    advance_progress(&main_pbar, &task, use_byte_progress);
}

fn advance_progress(pbar: &ProgressBar, task: &UploadTask, use_byte_progress: bool) {
    if use_byte_progress {
        pbar.inc(task.size.unwrap_or(0));
    } else {
        pbar.inc(1);
    }
}

/// 根据任务列表信息，配置并返回一个合适的进度条。
fn setup_progress_bar(
    tasks: &[UploadTask],
    max_workers: usize,
    all_sizes_available: bool,
) -> ProgressBar {
    if all_sizes_available {
        let total_size: u64 = tasks.iter().filter_map(|t| t.size).sum();
        ui::plain("");
        ui::info(&format!(
            "开始上传 {} 个文件 (总大小: {}) (并发数: {})...",
            tasks.len(),
            HumanBytes(total_size),
            max_workers
        ));
        ui::new_bytes_progress_bar(total_size, "上传")
    } else {
        ui::plain("");
        ui::warn("部分文件大小未知，将按文件数量显示进度。");
        ui::info(&format!(
            "开始上传 {} 个文件 (并发数: {})...",
            tasks.len(),
            max_workers
        ));
        ui::new_tasks_progress_bar(tasks.len() as u64, "上传")
    }
}
