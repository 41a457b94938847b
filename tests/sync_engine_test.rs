// tests/sync_engine_test.rs

use course_studio::{
    AuthorJobContext,
    client::RobustClient,
    config::AppConfig,
    editor::{CourseForm, EditorSession, LessonForm, ResourceForm, SectionForm},
    error::AppError,
    models::{CourseLevel, EntityId, LessonContent, ResourceKind, ResourceOwner},
    sync::{CourseSynchronizer, SyncManager},
    upload::UploadManager,
};
use mockito::Matcher;
use serde_json::json;
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

fn base_course(session: &mut EditorSession) {
    session
        .update_course_info(CourseForm {
            title: "Rust 实战".to_string(),
            description: "从零开始的 Rust 课程".to_string(),
            level: CourseLevel::Beginner,
            language: "zh-CN".to_string(),
            price: 199.0,
            discount_price: None,
        })
        .unwrap();
    session.set_category(7);
}

fn temp_file_with(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(content).unwrap();
    file
}

#[tokio::test]
async fn test_full_submission_persists_tree_in_dependency_order() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());

    // 课时正文与课程资源的上传端点
    let mock_content_upload = server
        .mock("POST", "/api/v1/uploads/lesson-content")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"file_url": "https://cdn.example.com/v/1.mp4"}"#)
        .create_async()
        .await;
    let mock_resource_upload = server
        .mock("POST", "/api/v1/uploads/course-resource")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"file_url": "https://cdn.example.com/r/1.pdf"}"#)
        .create_async()
        .await;

    // 依赖顺序: 课程 -> 章节 -> 课时 -> 标签/资源
    let mock_course = server
        .mock("POST", "/api/v1/courses")
        .match_body(Matcher::PartialJson(json!({
            "title": "Rust 实战",
            "category_id": 7,
            "level": "beginner",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 101}"#)
        .create_async()
        .await;
    let mock_section = server
        .mock("POST", "/api/v1/courses/101/sections")
        .match_body(Matcher::PartialJson(json!({
            "title": "第一章",
            "order": 1,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 11}"#)
        .create_async()
        .await;
    // 课时创建必须使用服务端下发的章节 ID，并携带上传解析出的 URL
    let mock_lesson = server
        .mock("POST", "/api/v1/courses/101/sections/11/lessons")
        .match_body(Matcher::PartialJson(json!({
            "content_type": "video",
            "content_url": "https://cdn.example.com/v/1.mp4",
            "duration": 600,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 21}"#)
        .create_async()
        .await;
    let mock_tags = server
        .mock("PUT", "/api/v1/courses/101/tags")
        .match_body(Matcher::PartialJson(json!({"tags": ["Rust"]})))
        .with_status(204)
        .create_async()
        .await;
    let mock_resource = server
        .mock("POST", "/api/v1/courses/101/resources")
        .match_body(Matcher::PartialJson(json!({
            "type": "PDF",
            "file_url": "https://cdn.example.com/r/1.pdf",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 31}"#)
        .create_async()
        .await;

    // 本地课程树
    let mut session = EditorSession::new();
    base_course(&mut session);
    session.add_tag("Rust");

    let section_id = session.add_section();
    session
        .save_section(SectionForm {
            id: section_id.clone(),
            title: "第一章".to_string(),
            description: None,
        })
        .unwrap();

    let video_file = temp_file_with(b"fake video bytes");
    let lesson_id = session.add_lesson(&section_id).unwrap();
    session
        .save_lesson(
            &section_id,
            LessonForm {
                id: lesson_id.clone(),
                title: "课堂视频".to_string(),
                description: String::new(),
                content: LessonContent::Video {
                    file: Some(video_file.path().to_path_buf()),
                    url: None,
                },
                duration_secs: 600,
                preview: true,
            },
        )
        .unwrap();

    let pdf_file = temp_file_with(b"%PDF-1.4 fake");
    let resource_id = session
        .add_resource(
            ResourceOwner::Course,
            ResourceForm {
                title: "课件".to_string(),
                kind: ResourceKind::Pdf,
                file: Some(pdf_file.path().to_path_buf()),
                url: None,
                is_downloadable: true,
            },
        )
        .unwrap();

    // --- 2. Act (执行阶段) ---
    let report = CourseSynchronizer::new(context)
        .run(&mut session)
        .await
        .expect("提交不应失败");

    // --- 3. Assert (断言阶段) ---
    mock_content_upload.assert_async().await;
    mock_resource_upload.assert_async().await;
    mock_course.assert_async().await;
    mock_section.assert_async().await;
    mock_lesson.assert_async().await;
    mock_tags.assert_async().await;
    mock_resource.assert_async().await;

    assert!(report.is_success(), "报告: {:?}", report);
    assert_eq!(report.course_id, Some(101));
    // 课程 + 章节 + 课时 + 标签 + 资源
    assert_eq!(report.stats.total, 5);
    assert_eq!(report.stats.success, 5);

    // 临时 ID 已全部对账为服务端下发的正式 ID
    assert_eq!(session.course.id, EntityId::Canonical(101));
    assert!(session.section(&section_id).is_none());
    assert!(session.section(&EntityId::Canonical(11)).is_some());
    let lesson = session.lesson(&EntityId::Canonical(21)).expect("课时未对账");
    assert_eq!(
        lesson.content.content_url().as_deref(),
        Some("https://cdn.example.com/v/1.mp4")
    );
    assert!(session.resource(&resource_id).is_none());
    assert!(session.resource(&EntityId::Canonical(31)).is_some());
}

#[tokio::test]
async fn test_section_failure_skips_its_lessons_but_not_siblings() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());

    let mock_course = server
        .mock("POST", "/api/v1/courses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 101}"#)
        .create_async()
        .await;
    // 章节创建失败 (400 不会触发重试)
    let mock_section = server
        .mock("POST", "/api/v1/courses/101/sections")
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;
    // 失败章节下的课时绝不能被提交
    let mock_lesson = server
        .mock(
            "POST",
            Matcher::Regex(r"^/api/v1/courses/101/sections/.+/lessons$".to_string()),
        )
        .expect(0)
        .create_async()
        .await;
    let mock_tags = server
        .mock("PUT", "/api/v1/courses/101/tags")
        .with_status(204)
        .create_async()
        .await;

    let mut session = EditorSession::new();
    base_course(&mut session);
    session.add_tag("Rust");
    let section_id = session.add_section();
    session
        .save_section(SectionForm {
            id: section_id.clone(),
            title: "第一章".to_string(),
            description: None,
        })
        .unwrap();
    let lesson_id = session.add_lesson(&section_id).unwrap();
    let content = session.lesson(&lesson_id).unwrap().content.clone();
    session
        .save_lesson(
            &section_id,
            LessonForm {
                id: lesson_id,
                title: "第一课".to_string(),
                description: String::new(),
                content,
                duration_secs: 0,
                preview: false,
            },
        )
        .unwrap();

    // --- 2. Act (执行阶段) ---
    let report = CourseSynchronizer::new(context)
        .run(&mut session)
        .await
        .expect("部分失败不应让整个提交崩溃");

    // --- 3. Assert (断言阶段) ---
    mock_course.assert_async().await;
    mock_section.assert_async().await;
    mock_lesson.assert_async().await;
    mock_tags.assert_async().await;

    // 尽力而为: 课程和标签照常保存，失败的章节及其课时进入报告
    assert!(!report.is_success());
    assert_eq!(report.course_id, Some(101));
    assert_eq!(report.stats.success, 2, "课程与标签应保存成功");
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.skipped, 1);
    assert!(report.failed[0].0.contains("第一章"));
    assert!(report.skipped[0].0.contains("第一课"));
}

#[tokio::test]
async fn test_validation_error_never_reaches_the_network() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());

    let mock_course = server
        .mock("POST", "/api/v1/courses")
        .expect(0)
        .create_async()
        .await;

    // 缺少分类的课程
    let mut session = EditorSession::new();
    session.course.title = "Rust 实战".to_string();

    // --- 2. Act (执行阶段) ---
    let result = CourseSynchronizer::new(context).run(&mut session).await;

    // --- 3. Assert (断言阶段) ---
    assert!(matches!(
        result,
        Err(AppError::Validation { ref field, .. }) if field == "category"
    ));
    mock_course.assert_async().await;
}

#[tokio::test]
async fn test_link_resource_skips_upload_pipeline() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());

    let mock_course = server
        .mock("POST", "/api/v1/courses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 101}"#)
        .create_async()
        .await;
    let mock_tags = server
        .mock("PUT", "/api/v1/courses/101/tags")
        .with_status(204)
        .create_async()
        .await;
    // LINK 资源直接以字面地址保存，上传端点不允许被调用
    let mock_upload = server
        .mock(
            "POST",
            Matcher::Regex(r"^/api/v1/uploads/.+$".to_string()),
        )
        .expect(0)
        .create_async()
        .await;
    let mock_resource = server
        .mock("POST", "/api/v1/courses/101/resources")
        .match_body(Matcher::PartialJson(json!({
            "type": "LINK",
            "file_url": "https://doc.rust-lang.org",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 41}"#)
        .create_async()
        .await;

    let mut session = EditorSession::new();
    base_course(&mut session);
    session
        .add_resource(
            ResourceOwner::Course,
            ResourceForm {
                title: "官方文档".to_string(),
                kind: ResourceKind::Link,
                file: None,
                url: Some("https://doc.rust-lang.org".to_string()),
                is_downloadable: false,
            },
        )
        .unwrap();

    // --- 2. Act (执行阶段) ---
    let report = CourseSynchronizer::new(context)
        .run(&mut session)
        .await
        .unwrap();

    // --- 3. Assert (断言阶段) ---
    mock_course.assert_async().await;
    mock_tags.assert_async().await;
    mock_upload.assert_async().await;
    mock_resource.assert_async().await;
    assert!(report.is_success());
}

#[tokio::test]
async fn test_existing_course_is_updated_in_place() {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let context = test_context(&server.url());

    // 已有正式 ID 的课程走更新而不是创建
    let mock_update = server
        .mock("PUT", "/api/v1/courses/55")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 55}"#)
        .create_async()
        .await;
    let mock_tags = server
        .mock("PUT", "/api/v1/courses/55/tags")
        .with_status(204)
        .create_async()
        .await;

    let mut session = EditorSession::for_existing_course(55);
    base_course(&mut session);

    // --- 2. Act (执行阶段) ---
    let report = CourseSynchronizer::new(context)
        .run(&mut session)
        .await
        .unwrap();

    // --- 3. Assert (断言阶段) ---
    mock_update.assert_async().await;
    mock_tags.assert_async().await;
    assert!(report.is_success());
    assert_eq!(report.course_id, Some(55));
    assert_eq!(report.stats.total, 2);
}
