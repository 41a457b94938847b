// tests/upload_pipeline_test.rs

use course_studio::{
    AuthorJobContext,
    client::RobustClient,
    config::AppConfig,
    error::AppError,
    models::EntityId,
    remote::{CourseApi, HttpCourseApi},
    sync::SyncManager,
    upload::{UploadKind, UploadManager, UploadStatus, UploadTask, execute_uploads},
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex as TokioMutex;

fn test_context(origin: &str) -> AuthorJobContext {
    let mut config = AppConfig::default();
    config.api_origin = origin.to_string();
    let config = Arc::new(config);
    AuthorJobContext {
        manager: SyncManager::new(),
        uploads: UploadManager::new(),
        token: Arc::new(TokioMutex::new("fake-token".to_string())),
        config: config.clone(),
        http_client: Arc::new(RobustClient::new(config).expect("创建客户端失败")),
    }
}

fn temp_file_with(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(content).unwrap();
    file
}

#[tokio::test]
async fn test_failed_upload_does_not_cancel_sibling_uploads() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());
    let api: Arc<dyn CourseApi> = Arc::new(HttpCourseApi::new(&context));

    // 课程资源桶正常返回 URL，课时附件桶返回 400（不可重试的失败）
    let mock_ok = server
        .mock("POST", "/api/v1/uploads/course-resource")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"file_url": "https://cdn.example.com/r/1.pdf"}"#)
        .create_async()
        .await;
    let mock_fail = server
        .mock("POST", "/api/v1/uploads/lesson-resource")
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;

    let file_a = temp_file_with(b"file a");
    let file_b = temp_file_with(b"file b");
    let tasks = vec![
        UploadTask::from_path(
            EntityId::Temp("resource-1".to_string()),
            UploadKind::CourseResource,
            file_a.path(),
        ),
        UploadTask::from_path(
            EntityId::Temp("resource-2".to_string()),
            UploadKind::LessonResource,
            file_b.path(),
        ),
    ];

    // --- 2. Act (执行阶段) ---
    let outcomes = execute_uploads(&context, api, tasks)
        .await
        .expect("批次本身不应失败");

    // --- 3. Assert (断言阶段) ---
    mock_ok.assert_async().await;
    mock_fail.assert_async().await;

    assert_eq!(outcomes.len(), 2);
    let ok = outcomes
        .iter()
        .find(|o| o.resource_id == EntityId::Temp("resource-1".to_string()))
        .expect("没有找到成功的上传结果");
    assert_eq!(ok.status, UploadStatus::Success);
    assert_eq!(
        ok.file_url.as_deref(),
        Some("https://cdn.example.com/r/1.pdf")
    );

    // 一个文件失败不影响另一个文件
    let failed = outcomes
        .iter()
        .find(|o| o.resource_id == EntityId::Temp("resource-2".to_string()))
        .expect("没有找到失败的上传结果");
    assert_eq!(failed.status, UploadStatus::HttpError);
    assert!(failed.file_url.is_none());

    let stats = context.uploads.get_stats();
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);
    assert!(!context.uploads.did_all_succeed());
}

#[tokio::test]
async fn test_retry_batch_skips_files_already_uploaded() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());
    let api: Arc<dyn CourseApi> = Arc::new(HttpCourseApi::new(&context));

    // 上传端点只允许被调用一次
    let mock_upload = server
        .mock("POST", "/api/v1/uploads/course-resource")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"file_url": "https://cdn.example.com/r/2.pdf"}"#)
        .expect(1)
        .create_async()
        .await;

    let file = temp_file_with(b"retry me");
    let task = UploadTask::from_path(
        EntityId::Temp("resource-3".to_string()),
        UploadKind::CourseResource,
        file.path(),
    );

    // --- 2. Act (执行阶段) ---
    let first = execute_uploads(&context, api.clone(), vec![task.clone()])
        .await
        .unwrap();
    // 作者重试同一批文件：已成功的文件直接命中缓存
    let second = execute_uploads(&context, api, vec![task]).await.unwrap();

    // --- 3. Assert (断言阶段) ---
    mock_upload.assert_async().await;
    assert_eq!(first[0].status, UploadStatus::Success);
    assert_eq!(second[0].status, UploadStatus::Skipped);
    assert_eq!(
        second[0].file_url.as_deref(),
        Some("https://cdn.example.com/r/2.pdf")
    );
}

#[tokio::test]
async fn test_token_failure_aborts_the_batch() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());
    let api: Arc<dyn CourseApi> = Arc::new(HttpCourseApi::new(&context));

    server
        .mock("POST", "/api/v1/uploads/course-resource")
        .with_status(401)
        .with_body("unauthorized")
        .create_async()
        .await;

    let file = temp_file_with(b"secret");
    let task = UploadTask::from_path(
        EntityId::Temp("resource-4".to_string()),
        UploadKind::CourseResource,
        file.path(),
    );

    // --- 2. Act & Assert ---
    let result = execute_uploads(&context, api, vec![task]).await;
    assert!(matches!(result, Err(AppError::TokenInvalid)));
}
