// src/editor/mutation.rs

use super::EditorSession;
use crate::{
    constants,
    error::*,
    models::{
        ContentKind, CourseLevel, EntityId, Lesson, LessonContent, ResourceDraft, ResourceKind,
        ResourceOwner, ResourceSource, Section,
    },
};
use log::{debug, info, warn};
use std::path::PathBuf;
use url::Url;

/// 章节编辑对话框提交的表单。
#[derive(Debug, Clone)]
pub struct SectionForm {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
}

/// 课程基本信息表单。
#[derive(Debug, Clone)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub language: String,
    pub price: f64,
    pub discount_price: Option<f64>,
}

/// 课时编辑表单；content 变体本身约束了哪些字段合法。
#[derive(Debug, Clone)]
pub struct LessonForm {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub content: LessonContent,
    pub duration_secs: u32,
    pub preview: bool,
}

/// 新增资源的表单。LINK 填 url，其余类型选择本地文件。
#[derive(Debug, Clone)]
pub struct ResourceForm {
    pub title: String,
    pub kind: ResourceKind,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub is_downloadable: bool,
}

/// 本地变更引擎。全部操作同步完成，只改内存中的树，不触网。
impl EditorSession {
    pub fn add_section(&mut self) -> EntityId {
        let id = self.mint_temp_id(constants::temp_id::SECTION);
        let order = self.course.section_ids.len() as u32 + 1;
        self.sections.insert(
            id.clone(),
            Section {
                id: id.clone(),
                title: String::new(),
                description: None,
                order,
                lesson_ids: Vec::new(),
            },
        );
        self.course.section_ids.push(id.clone());
        debug!("新增章节 {} (order={})", id, order);
        id
    }

    pub fn save_section(&mut self, form: SectionForm) -> AppResult<()> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title", "章节标题不能为空"));
        }
        match self.sections.get_mut(&form.id) {
            Some(section) => {
                section.title = title.to_string();
                section.description = form.description;
            }
            // 按标识符 upsert：未知 ID 视为追加到末尾
            None => {
                let order = self.course.section_ids.len() as u32 + 1;
                self.sections.insert(
                    form.id.clone(),
                    Section {
                        id: form.id.clone(),
                        title: title.to_string(),
                        description: form.description,
                        order,
                        lesson_ids: Vec::new(),
                    },
                );
                self.course.section_ids.push(form.id.clone());
            }
        }
        Ok(())
    }

    /// 级联删除章节及其全部课时与附件，随后重排剩余章节的 order。
    pub fn delete_section(&mut self, id: &EntityId) {
        let Some(section) = self.sections.remove(id) else {
            warn!("尝试删除不存在的章节 {}", id);
            return;
        };
        for lesson_id in &section.lesson_ids {
            if let Some(lesson) = self.lessons.remove(lesson_id) {
                for attachment_id in &lesson.attachment_ids {
                    self.resources.remove(attachment_id);
                }
            }
        }
        self.course.section_ids.retain(|sid| sid != id);
        self.renumber_sections();
        info!("删除章节 {} 及其 {} 个课时", id, section.lesson_ids.len());
    }

    pub fn add_lesson(&mut self, section_id: &EntityId) -> AppResult<EntityId> {
        if !self.sections.contains_key(section_id) {
            return Err(AppError::validation(
                "section",
                format!("章节 '{}' 不存在", section_id),
            ));
        }
        let id = self.mint_temp_id(constants::temp_id::LESSON);
        let order = self.sections[section_id].lesson_ids.len() as u32 + 1;
        self.lessons.insert(
            id.clone(),
            Lesson {
                id: id.clone(),
                title: String::new(),
                description: String::new(),
                // 默认视频类型，与来源行为一致
                content: LessonContent::empty_of(ContentKind::Video),
                duration_secs: 0,
                order,
                preview: false,
                attachment_ids: Vec::new(),
            },
        );
        if let Some(section) = self.sections.get_mut(section_id) {
            section.lesson_ids.push(id.clone());
        }
        debug!("章节 {} 下新增课时 {} (order={})", section_id, id, order);
        Ok(id)
    }

    pub fn save_lesson(&mut self, section_id: &EntityId, form: LessonForm) -> AppResult<()> {
        let title = form.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("title", "课时标题不能为空"));
        }
        let Some(section) = self.sections.get_mut(section_id) else {
            return Err(AppError::validation(
                "section",
                format!("章节 '{}' 不存在", section_id),
            ));
        };

        // pdf/quiz 约定时长为 0
        let duration_secs = match form.content.kind() {
            ContentKind::Pdf | ContentKind::Quiz => 0,
            _ => form.duration_secs,
        };

        match self.lessons.get_mut(&form.id) {
            Some(existing) => {
                if !section.lesson_ids.contains(&form.id) {
                    return Err(AppError::validation(
                        "lesson",
                        format!("课时 '{}' 不属于章节 '{}'", form.id, section_id),
                    ));
                }
                existing.title = title;
                existing.description = form.description;
                existing.content = form.content;
                existing.duration_secs = duration_secs;
                existing.preview = form.preview;
            }
            None => {
                let order = section.lesson_ids.len() as u32 + 1;
                section.lesson_ids.push(form.id.clone());
                self.lessons.insert(
                    form.id.clone(),
                    Lesson {
                        id: form.id.clone(),
                        title,
                        description: form.description,
                        content: form.content,
                        duration_secs,
                        order,
                        preview: form.preview,
                        attachment_ids: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    /// 切换课时内容类型：替换为新类型的空内容，旧变体的字段随之清空。
    pub fn set_content_kind(&mut self, lesson_id: &EntityId, kind: ContentKind) -> AppResult<()> {
        let Some(lesson) = self.lessons.get_mut(lesson_id) else {
            return Err(AppError::validation(
                "lesson",
                format!("课时 '{}' 不存在", lesson_id),
            ));
        };
        if lesson.content.kind() == kind {
            return Ok(());
        }
        debug!(
            "课时 {} 内容类型 {} -> {}",
            lesson_id,
            lesson.content.kind(),
            kind
        );
        lesson.content = LessonContent::empty_of(kind);
        if matches!(kind, ContentKind::Pdf | ContentKind::Quiz) {
            lesson.duration_secs = 0;
        }
        Ok(())
    }

    pub fn delete_lesson(&mut self, section_id: &EntityId, id: &EntityId) {
        let Some(lesson) = self.lessons.remove(id) else {
            warn!("尝试删除不存在的课时 {}", id);
            return;
        };
        for attachment_id in &lesson.attachment_ids {
            self.resources.remove(attachment_id);
        }
        if let Some(section) = self.sections.get_mut(section_id) {
            section.lesson_ids.retain(|lid| lid != id);
        }
        self.renumber_lessons(section_id);
    }

    /// 集合语义：已存在则不重复添加。返回是否实际加入。
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.course.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.course.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.course.tags.retain(|t| t != tag);
    }

    pub fn add_resource(
        &mut self,
        owner: ResourceOwner,
        form: ResourceForm,
    ) -> AppResult<EntityId> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title", "资源标题不能为空"));
        }
        if let ResourceOwner::Lesson(lesson_id) = &owner
            && !self.lessons.contains_key(lesson_id)
        {
            return Err(AppError::validation(
                "lesson",
                format!("课时 '{}' 不存在", lesson_id),
            ));
        }

        let source = match form.kind {
            ResourceKind::Link => {
                if form.file.is_some() {
                    return Err(AppError::validation("file", "链接资源不能携带文件"));
                }
                let url = form
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| AppError::validation("url", "链接资源必须填写地址"))?;
                Url::parse(url)?;
                ResourceSource::Link {
                    url: url.to_string(),
                }
            }
            _ => {
                if form.url.is_some() {
                    return Err(AppError::validation(
                        "url",
                        "文件资源的地址只能由上传管线生成",
                    ));
                }
                let path = form
                    .file
                    .ok_or_else(|| AppError::validation("file", "未选择任何文件"))?;
                // 规范化路径并确认文件存在，失败即校验错误而不是留到上传阶段
                let path = dunce::canonicalize(&path).map_err(|_| {
                    AppError::validation("file", format!("文件 '{}' 不存在", path.display()))
                })?;
                ResourceSource::File {
                    path,
                    uploaded_url: None,
                }
            }
        };

        let id = self.mint_temp_id(constants::temp_id::RESOURCE);
        self.resources.insert(
            id.clone(),
            ResourceDraft {
                id: id.clone(),
                title: title.to_string(),
                kind: form.kind,
                source,
                is_downloadable: form.is_downloadable,
                owner: owner.clone(),
            },
        );
        match owner {
            ResourceOwner::Course => self.course.resource_ids.push(id.clone()),
            ResourceOwner::Lesson(lesson_id) => {
                if let Some(lesson) = self.lessons.get_mut(&lesson_id) {
                    lesson.attachment_ids.push(id.clone());
                }
            }
        }
        Ok(id)
    }

    pub fn remove_resource(&mut self, id: &EntityId) {
        let Some(resource) = self.resources.remove(id) else {
            return;
        };
        match resource.owner {
            ResourceOwner::Course => self.course.resource_ids.retain(|rid| rid != id),
            ResourceOwner::Lesson(lesson_id) => {
                if let Some(lesson) = self.lessons.get_mut(&lesson_id) {
                    lesson.attachment_ids.retain(|rid| rid != id);
                }
            }
        }
    }

    pub fn update_course_info(&mut self, form: CourseForm) -> AppResult<()> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title", "课程标题不能为空"));
        }
        if form.price < 0.0 {
            return Err(AppError::validation("price", "价格不能为负数"));
        }
        self.course.title = title.to_string();
        self.course.description = form.description;
        self.course.level = form.level;
        self.course.language = form.language;
        self.course.price = form.price;
        self.course.discount_price = form.discount_price;
        Ok(())
    }

    pub fn set_category(&mut self, category_id: u64) {
        self.course.category_id = Some(category_id);
    }

    /// 提交前的整树校验。校验失败在这里同步拦截，永远不会发起网络请求。
    pub fn validate_for_submit(&self) -> AppResult<()> {
        if self.course.title.trim().is_empty() {
            return Err(AppError::validation("title", "课程标题不能为空"));
        }
        if self.course.category_id.is_none() {
            return Err(AppError::validation("category", "提交前必须选择课程分类"));
        }
        for section in self.sections_in_order() {
            if section.title.trim().is_empty() {
                return Err(AppError::validation(
                    "section.title",
                    format!("章节 '{}' 尚未填写标题", section.id),
                ));
            }
            for lesson in self.lessons_of(&section.id) {
                if lesson.title.trim().is_empty() {
                    return Err(AppError::validation(
                        "lesson.title",
                        format!("课时 '{}' 尚未填写标题", lesson.id),
                    ));
                }
            }
        }
        for resource in self.resources.values() {
            match &resource.source {
                ResourceSource::Link { url } if url.trim().is_empty() => {
                    return Err(AppError::validation(
                        "url",
                        format!("链接资源 '{}' 缺少地址", resource.title),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
