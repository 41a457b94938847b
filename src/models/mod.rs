// src/models/mod.rs

pub mod api;

use std::fmt;
use std::path::{Path, PathBuf};

/// 实体标识符。客户端新建的节点持有临时 ID，远端创建成功后被正式 ID 替换（对账）。
/// 临时 ID 绝不会出现在引用父节点的持久化调用里。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Temp(String),
    Canonical(u64),
}

impl EntityId {
    pub fn is_temp(&self) -> bool {
        matches!(self, EntityId::Temp(_))
    }

    pub fn as_canonical(&self) -> Option<u64> {
        match self {
            EntityId::Canonical(id) => Some(*id),
            EntityId::Temp(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Temp(s) => write!(f, "{}", s),
            EntityId::Canonical(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
            CourseLevel::AllLevels => "all_levels",
        }
    }
}

/// 课时内容类型的判别标签，与 LessonContent 的变体一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Video,
    Pdf,
    Article,
    Quiz,
    Assignment,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Video => "video",
            ContentKind::Pdf => "pdf",
            ContentKind::Article => "article",
            ContentKind::Quiz => "quiz",
            ContentKind::Assignment => "assignment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 课时内容。每个变体只携带自己合法的字段，切换类型即丢弃旧变体的字段，
/// 不存在两个变体字段同时非空的状态。
#[derive(Debug, Clone, PartialEq)]
pub enum LessonContent {
    /// 视频课时：作者选择的本地文件在上传完成后解析出正式 URL。
    Video {
        file: Option<PathBuf>,
        url: Option<String>,
    },
    Pdf {
        file: Option<PathBuf>,
        url: Option<String>,
    },
    /// 图文课时，正文直接作为内容提交。
    Article { body: String },
    Quiz,
    Assignment { body: String },
}

impl LessonContent {
    pub fn empty_of(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Video => LessonContent::Video {
                file: None,
                url: None,
            },
            ContentKind::Pdf => LessonContent::Pdf {
                file: None,
                url: None,
            },
            ContentKind::Article => LessonContent::Article {
                body: String::new(),
            },
            ContentKind::Quiz => LessonContent::Quiz,
            ContentKind::Assignment => LessonContent::Assignment {
                body: String::new(),
            },
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            LessonContent::Video { .. } => ContentKind::Video,
            LessonContent::Pdf { .. } => ContentKind::Pdf,
            LessonContent::Article { .. } => ContentKind::Article,
            LessonContent::Quiz => ContentKind::Quiz,
            LessonContent::Assignment { .. } => ContentKind::Assignment,
        }
    }

    /// 已选定本地文件但还没有正式 URL 时，返回待上传的文件路径。
    pub fn pending_upload(&self) -> Option<&Path> {
        match self {
            LessonContent::Video {
                file: Some(path),
                url: None,
            }
            | LessonContent::Pdf {
                file: Some(path),
                url: None,
            } => Some(path),
            _ => None,
        }
    }

    /// 提交到远端的内容字段：视频/PDF 为已上传的 URL，图文/作业为正文。
    pub fn content_url(&self) -> Option<String> {
        match self {
            LessonContent::Video { url, .. } | LessonContent::Pdf { url, .. } => url.clone(),
            LessonContent::Article { body } | LessonContent::Assignment { body } => {
                Some(body.clone())
            }
            LessonContent::Quiz => None,
        }
    }

    pub fn set_resolved_url(&mut self, resolved: String) {
        match self {
            LessonContent::Video { url, .. } | LessonContent::Pdf { url, .. } => {
                *url = Some(resolved);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// 提交前必须选定分类，否则本地校验直接拦截。
    pub category_id: Option<u64>,
    pub level: CourseLevel,
    pub language: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub section_ids: Vec<EntityId>,
    pub tags: Vec<String>,
    pub resource_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    /// 同级集合内 1..N 连续递增，任何增删/拖拽后立即重排。
    pub order: u32,
    pub lesson_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub content: LessonContent,
    /// 秒数；pdf/quiz 类型约定为 0，保存时强制归一。
    pub duration_secs: u32,
    pub order: u32,
    pub preview: bool,
    pub attachment_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Pdf,
    Document,
    Video,
    Audio,
    Link,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pdf => "PDF",
            ResourceKind::Document => "DOCUMENT",
            ResourceKind::Video => "VIDEO",
            ResourceKind::Audio => "AUDIO",
            ResourceKind::Link => "LINK",
        }
    }

    /// LINK 类型直接引用外部地址，其余类型必须经上传管线换取 URL。
    pub fn requires_upload(&self) -> bool {
        !matches!(self, ResourceKind::Link)
    }
}

/// 资源的内容来源。LINK 资源永远不携带文件；文件资源在上传成功前没有可信的 URL。
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSource {
    Link { url: String },
    File {
        path: PathBuf,
        uploaded_url: Option<String>,
    },
}

impl ResourceSource {
    /// 可提交到远端的最终 URL。文件资源在上传完成前返回 None。
    pub fn resolved_url(&self) -> Option<&str> {
        match self {
            ResourceSource::Link { url } => Some(url),
            ResourceSource::File { uploaded_url, .. } => uploaded_url.as_deref(),
        }
    }

    pub fn pending_upload(&self) -> Option<&Path> {
        match self {
            ResourceSource::File {
                path,
                uploaded_url: None,
            } => Some(path),
            _ => None,
        }
    }
}

/// 资源归属：课程级资源列表或课时附件列表，两个集合形状相同、互相独立。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOwner {
    Course,
    Lesson(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDraft {
    pub id: EntityId,
    pub title: String,
    pub kind: ResourceKind,
    pub source: ResourceSource,
    pub is_downloadable: bool,
    pub owner: ResourceOwner,
}
