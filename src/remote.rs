// src/remote.rs

use crate::{
    AuthorJobContext,
    client::RobustClient,
    config::AppConfig,
    constants::api::endpoints,
    error::*,
    models::api::{
        CoursePayload, IdResponse, LessonPayload, ResourcePayload, SectionPayload, TagsPayload,
        UploadResponse,
    },
    upload::UploadTask,
    utils,
};
use anyhow::anyhow;
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use tokio_util::io::ReaderStream;

/// 远端课程服务的抽象契约。同步引擎与上传管线只依赖这个 trait，
/// 具体的 HTTP 细节（端点、载荷编码）留给实现方。
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn create_course(&self, payload: &CoursePayload) -> AppResult<u64>;
    async fn update_course(&self, course_id: u64, payload: &CoursePayload) -> AppResult<u64>;
    async fn add_section(&self, course_id: u64, payload: &SectionPayload) -> AppResult<u64>;
    async fn update_section(
        &self,
        course_id: u64,
        section_id: u64,
        payload: &SectionPayload,
    ) -> AppResult<u64>;
    async fn add_lesson(
        &self,
        course_id: u64,
        section_id: u64,
        payload: &LessonPayload,
    ) -> AppResult<u64>;
    async fn update_lesson(
        &self,
        course_id: u64,
        section_id: u64,
        lesson_id: u64,
        payload: &LessonPayload,
    ) -> AppResult<u64>;
    /// 整批替换课程标签。
    async fn replace_tags(&self, course_id: u64, tags: &[String]) -> AppResult<()>;
    async fn add_course_resource(&self, course_id: u64, payload: &ResourcePayload)
    -> AppResult<u64>;
    async fn update_course_resource(
        &self,
        course_id: u64,
        resource_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64>;
    async fn add_lesson_resource(
        &self,
        course_id: u64,
        lesson_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64>;
    async fn update_lesson_resource(
        &self,
        course_id: u64,
        lesson_id: u64,
        resource_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64>;
    /// 上传单个文件到 kind 对应的存储桶，返回持久化 URL。
    async fn upload_file(&self, task: &UploadTask) -> AppResult<String>;
}

/// 基于 URL 模板的 HTTP 实现。模板来自配置文件，
/// 渲染时替换 {origin} 与各路径参数。
pub struct HttpCourseApi {
    http_client: Arc<RobustClient>,
    config: Arc<AppConfig>,
    token: Arc<TokioMutex<String>>,
}

impl HttpCourseApi {
    pub fn new(context: &AuthorJobContext) -> Self {
        Self {
            http_client: context.http_client.clone(),
            config: context.config.clone(),
            token: context.token.clone(),
        }
    }

    fn render_url(&self, template_key: &str, params: &[(&str, &str)]) -> AppResult<String> {
        let template = self
            .config
            .url_templates
            .get(template_key)
            .ok_or_else(|| AppError::Other(anyhow!("未找到 URL 模板 '{}'", template_key)))?;
        let mut url = template.replace("{origin}", &self.config.api_origin);
        for (key, val) in params {
            url = url.replace(&format!("{{{}}}", key), val);
        }
        Ok(url)
    }

    async fn token(&self) -> String {
        self.token.lock().await.clone()
    }

    fn parse<T: DeserializeOwned>(url: &str, value: Value) -> AppResult<T> {
        serde_json::from_value(value).map_err(|e| AppError::ApiParseFailed {
            url: url.to_string(),
            source: e,
        })
    }

    async fn post_for_id<T: serde::Serialize>(&self, url: String, payload: &T) -> AppResult<u64> {
        let token = self.token().await;
        let value = self.http_client.post_json(&url, &token, payload).await?;
        Ok(Self::parse::<IdResponse>(&url, value)?.id)
    }

    async fn put_for_id<T: serde::Serialize>(&self, url: String, payload: &T) -> AppResult<u64> {
        let token = self.token().await;
        let value = self.http_client.put_json(&url, &token, payload).await?;
        Ok(Self::parse::<IdResponse>(&url, value)?.id)
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn create_course(&self, payload: &CoursePayload) -> AppResult<u64> {
        let url = self.render_url(endpoints::COURSE_CREATE, &[])?;
        debug!("创建课程: {}", url);
        self.post_for_id(url, payload).await
    }

    async fn update_course(&self, course_id: u64, payload: &CoursePayload) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::COURSE_UPDATE,
            &[("course_id", &course_id.to_string())],
        )?;
        self.put_for_id(url, payload).await
    }

    async fn add_section(&self, course_id: u64, payload: &SectionPayload) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::SECTION_CREATE,
            &[("course_id", &course_id.to_string())],
        )?;
        self.post_for_id(url, payload).await
    }

    async fn update_section(
        &self,
        course_id: u64,
        section_id: u64,
        payload: &SectionPayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::SECTION_UPDATE,
            &[
                ("course_id", &course_id.to_string()),
                ("section_id", &section_id.to_string()),
            ],
        )?;
        self.put_for_id(url, payload).await
    }

    async fn add_lesson(
        &self,
        course_id: u64,
        section_id: u64,
        payload: &LessonPayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::LESSON_CREATE,
            &[
                ("course_id", &course_id.to_string()),
                ("section_id", &section_id.to_string()),
            ],
        )?;
        self.post_for_id(url, payload).await
    }

    async fn update_lesson(
        &self,
        course_id: u64,
        section_id: u64,
        lesson_id: u64,
        payload: &LessonPayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::LESSON_UPDATE,
            &[
                ("course_id", &course_id.to_string()),
                ("section_id", &section_id.to_string()),
                ("lesson_id", &lesson_id.to_string()),
            ],
        )?;
        self.put_for_id(url, payload).await
    }

    async fn replace_tags(&self, course_id: u64, tags: &[String]) -> AppResult<()> {
        let url = self.render_url(
            endpoints::TAGS_REPLACE,
            &[("course_id", &course_id.to_string())],
        )?;
        let token = self.token().await;
        let payload = TagsPayload {
            tags: tags.to_vec(),
        };
        self.http_client.put_json(&url, &token, &payload).await?;
        Ok(())
    }

    async fn add_course_resource(
        &self,
        course_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::COURSE_RESOURCE_CREATE,
            &[("course_id", &course_id.to_string())],
        )?;
        self.post_for_id(url, payload).await
    }

    async fn update_course_resource(
        &self,
        course_id: u64,
        resource_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::COURSE_RESOURCE_UPDATE,
            &[
                ("course_id", &course_id.to_string()),
                ("resource_id", &resource_id.to_string()),
            ],
        )?;
        self.put_for_id(url, payload).await
    }

    async fn add_lesson_resource(
        &self,
        course_id: u64,
        lesson_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::LESSON_RESOURCE_CREATE,
            &[
                ("course_id", &course_id.to_string()),
                ("lesson_id", &lesson_id.to_string()),
            ],
        )?;
        self.post_for_id(url, payload).await
    }

    async fn update_lesson_resource(
        &self,
        course_id: u64,
        lesson_id: u64,
        resource_id: u64,
        payload: &ResourcePayload,
    ) -> AppResult<u64> {
        let url = self.render_url(
            endpoints::LESSON_RESOURCE_UPDATE,
            &[
                ("course_id", &course_id.to_string()),
                ("lesson_id", &lesson_id.to_string()),
                ("resource_id", &resource_id.to_string()),
            ],
        )?;
        self.put_for_id(url, payload).await
    }

    async fn upload_file(&self, task: &UploadTask) -> AppResult<String> {
        let url = self.render_url(endpoints::UPLOAD, &[("kind", task.kind.as_str())])?;
        debug!("上传文件 '{}' 到 {}", task.path.display(), url);

        // 内容校验和随表单一起提交，供服务端核对
        let md5 = utils::file_md5(&task.path)?;
        let file = tokio::fs::File::open(&task.path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = match task.size {
            Some(len) => Part::stream_with_length(body, len),
            None => Part::stream(body),
        }
        .file_name(task.display_name.clone());
        let form = Form::new().part("file", part).text("md5", md5);

        let token = self.token().await;
        let value = self.http_client.post_multipart(&url, &token, form).await?;
        Ok(Self::parse::<UploadResponse>(&url, value)?.file_url)
    }
}
