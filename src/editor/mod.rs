// src/editor/mod.rs

mod mutation;
mod reorder;
mod wizard;

pub use mutation::{CourseForm, LessonForm, ResourceForm, SectionForm};
pub use reorder::MoveRequest;
pub use wizard::{AuthorWizard, WizardStep};

use crate::{
    constants,
    models::{CourseDraft, CourseLevel, EntityId, Lesson, ResourceDraft, ResourceOwner, Section},
    utils,
};
use log::debug;
use std::collections::HashMap;

/// 一次编辑会话的全部本地状态：平铺的实体仓（arena）加有序 ID 列表。
/// 打开编辑器时构建，关闭即丢弃未提交的变更；所有修改都必须经由本模块的
/// 变更操作进行，外部只拿得到只读视图。
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    pub course: CourseDraft,
    pub(crate) sections: HashMap<EntityId, Section>,
    pub(crate) lessons: HashMap<EntityId, Lesson>,
    pub(crate) resources: HashMap<EntityId, ResourceDraft>,
    next_seq: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        let mut session = Self {
            course: CourseDraft {
                id: EntityId::Temp(String::new()),
                title: String::new(),
                description: String::new(),
                category_id: None,
                level: CourseLevel::default(),
                language: constants::DEFAULT_LANGUAGE.to_string(),
                price: 0.0,
                discount_price: None,
                section_ids: Vec::new(),
                tags: Vec::new(),
                resource_ids: Vec::new(),
            },
            sections: HashMap::new(),
            lessons: HashMap::new(),
            resources: HashMap::new(),
            next_seq: 0,
        };
        session.course.id = session.mint_temp_id(constants::temp_id::COURSE);
        session
    }

    /// 编辑已存在的远端课程时，以正式课程 ID 开始会话。
    pub fn for_existing_course(course_id: u64) -> Self {
        let mut session = Self::new();
        session.course.id = EntityId::Canonical(course_id);
        session
    }

    pub(crate) fn mint_temp_id(&mut self, prefix: &str) -> EntityId {
        self.next_seq += 1;
        EntityId::Temp(utils::temp_id(prefix, self.next_seq))
    }

    // --- 只读访问 ---

    pub fn section(&self, id: &EntityId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn lesson(&self, id: &EntityId) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    pub fn resource(&self, id: &EntityId) -> Option<&ResourceDraft> {
        self.resources.get(id)
    }

    /// 按展示顺序返回章节。
    pub fn sections_in_order(&self) -> Vec<&Section> {
        self.course
            .section_ids
            .iter()
            .filter_map(|id| self.sections.get(id))
            .collect()
    }

    /// 按展示顺序返回某章节下的课时。
    pub fn lessons_of(&self, section_id: &EntityId) -> Vec<&Lesson> {
        self.sections
            .get(section_id)
            .map(|s| {
                s.lesson_ids
                    .iter()
                    .filter_map(|id| self.lessons.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    // --- 排序维护 ---

    /// 章节 order 重排为 1..N（按当前展示顺序）。
    pub(crate) fn renumber_sections(&mut self) {
        let ids = self.course.section_ids.clone();
        for (idx, id) in ids.iter().enumerate() {
            if let Some(section) = self.sections.get_mut(id) {
                section.order = idx as u32 + 1;
            }
        }
    }

    /// 某章节下课时 order 重排为 1..N。
    pub(crate) fn renumber_lessons(&mut self, section_id: &EntityId) {
        let Some(ids) = self.sections.get(section_id).map(|s| s.lesson_ids.clone()) else {
            return;
        };
        for (idx, id) in ids.iter().enumerate() {
            if let Some(lesson) = self.lessons.get_mut(id) {
                lesson.order = idx as u32 + 1;
            }
        }
    }

    // --- 标识符对账：远端创建成功后，用正式 ID 替换临时 ID ---

    pub(crate) fn reconcile_course(&mut self, canonical: u64) {
        debug!("课程 {} 对账为正式 ID {}", self.course.id, canonical);
        self.course.id = EntityId::Canonical(canonical);
    }

    pub(crate) fn reconcile_section(&mut self, temp: &EntityId, canonical: u64) {
        let new_id = EntityId::Canonical(canonical);
        if let Some(mut section) = self.sections.remove(temp) {
            debug!("章节 {} 对账为正式 ID {}", temp, canonical);
            section.id = new_id.clone();
            self.sections.insert(new_id.clone(), section);
        }
        if let Some(slot) = self.course.section_ids.iter_mut().find(|id| *id == temp) {
            *slot = new_id;
        }
    }

    pub(crate) fn reconcile_lesson(&mut self, section_id: &EntityId, temp: &EntityId, canonical: u64) {
        let new_id = EntityId::Canonical(canonical);
        if let Some(mut lesson) = self.lessons.remove(temp) {
            debug!("课时 {} 对账为正式 ID {}", temp, canonical);
            lesson.id = new_id.clone();
            self.lessons.insert(new_id.clone(), lesson);
        }
        if let Some(section) = self.sections.get_mut(section_id)
            && let Some(slot) = section.lesson_ids.iter_mut().find(|id| *id == temp)
        {
            *slot = new_id.clone();
        }
        // 指向该课时的附件归属也要跟着迁移
        for resource in self.resources.values_mut() {
            if resource.owner == ResourceOwner::Lesson(temp.clone()) {
                resource.owner = ResourceOwner::Lesson(new_id.clone());
            }
        }
    }

    pub(crate) fn reconcile_resource(&mut self, temp: &EntityId, canonical: u64) {
        let new_id = EntityId::Canonical(canonical);
        let Some(mut resource) = self.resources.remove(temp) else {
            return;
        };
        debug!("资源 {} 对账为正式 ID {}", temp, canonical);
        resource.id = new_id.clone();
        let owner = resource.owner.clone();
        self.resources.insert(new_id.clone(), resource);
        let list = match owner {
            ResourceOwner::Course => Some(&mut self.course.resource_ids),
            ResourceOwner::Lesson(ref lesson_id) => self
                .lessons
                .get_mut(lesson_id)
                .map(|l| &mut l.attachment_ids),
        };
        if let Some(list) = list
            && let Some(slot) = list.iter_mut().find(|id| *id == temp)
        {
            *slot = new_id;
        }
    }

    /// 上传管线解析出正式 URL 后回填到文件资源。
    pub(crate) fn resolve_resource_upload(&mut self, id: &EntityId, url: String) {
        if let Some(resource) = self.resources.get_mut(id)
            && let crate::models::ResourceSource::File { uploaded_url, .. } = &mut resource.source
        {
            *uploaded_url = Some(url);
        }
    }

    /// 课时正文文件（视频/PDF）上传完成后回填 URL。
    pub(crate) fn resolve_lesson_content_upload(&mut self, id: &EntityId, url: String) {
        if let Some(lesson) = self.lessons.get_mut(id) {
            lesson.content.set_resolved_url(url);
        }
    }
}
