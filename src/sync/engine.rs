// src/sync/engine.rs

use super::SyncReport;
use crate::{
    AuthorJobContext,
    editor::EditorSession,
    error::*,
    models::{
        CourseDraft, EntityId, Lesson, ResourceOwner, Section,
        api::{CoursePayload, LessonPayload, ResourcePayload, SectionPayload},
    },
    remote::{CourseApi, HttpCourseApi},
    ui,
    upload::{UploadKind, UploadTask, execute_uploads},
};
use log::{info, warn};
use std::{collections::HashSet, sync::Arc};

/// 同步/对账引擎：把校验通过的本地课程树按依赖顺序写入远端，
/// 临时 ID 在远端创建成功后逐个替换为正式 ID。
///
/// 提交是尽力而为的（后端没有批量事务接口）：某个节点失败不会回滚
/// 已保存的兄弟节点，所有结果汇入聚合报告呈现给作者。
pub struct CourseSynchronizer {
    context: AuthorJobContext,
    api: Arc<dyn CourseApi>,
}

impl CourseSynchronizer {
    pub fn new(context: AuthorJobContext) -> Self {
        let api = Arc::new(HttpCourseApi::new(&context));
        Self { context, api }
    }

    /// 注入自定义的远端实现，主要供测试使用。
    pub fn with_api(context: AuthorJobContext, api: Arc<dyn CourseApi>) -> Self {
        Self { context, api }
    }

    pub async fn run(&self, session: &mut EditorSession) -> AppResult<SyncReport> {
        if self.context.token.lock().await.is_empty() {
            return Err(AppError::TokenMissing);
        }
        // 校验失败在触网之前同步拦截
        session.validate_for_submit()?;

        // 课程 + 标签各占一个节点
        let total = 2
            + session.course.section_ids.len()
            + session.lesson_count()
            + session.resource_count();
        self.context.manager.start_batch(total);
        ui::print_header(&format!("提交课程 '{}'", session.course.title));

        // 阶段一: 课时正文文件（视频/PDF）先行上传，URL 回填进树
        let failed_content = self.upload_lesson_content(session).await?;

        // 阶段二: 课程主体。失败即终止，子节点没有可挂载的父级。
        let course_id = match self.persist_course(session).await {
            Ok(id) => {
                self.context.manager.record_success();
                id
            }
            Err(e) => {
                self.context
                    .manager
                    .record_failure(&format!("课程 '{}'", session.course.title), &e.to_string());
                let report = self.context.manager.snapshot(None);
                self.context.manager.print_report();
                return Ok(report);
            }
        };

        // 阶段三: 章节与课时，严格按依赖顺序逐个提交
        for i in 0..session.course.section_ids.len() {
            let section_id = session.course.section_ids[i].clone();
            let Some(section) = session.section(&section_id).cloned() else {
                continue;
            };
            let label = format!("章节 '{}'", section.title);
            match self.persist_section(session, course_id, &section).await {
                Ok(canonical_sid) => {
                    self.context.manager.record_success();
                    self.persist_section_lessons(session, course_id, canonical_sid, &failed_content)
                        .await;
                }
                Err(e) => {
                    // 已知限制: 章节保存失败时，其下课时整体跳过
                    self.context.manager.record_failure(&label, &e.to_string());
                    let skipped: Vec<String> = session
                        .lessons_of(&section_id)
                        .iter()
                        .map(|l| format!("课时 '{}'", l.title))
                        .collect();
                    for lesson_label in skipped {
                        self.context
                            .manager
                            .record_skip(&lesson_label, "所属章节保存失败");
                    }
                }
            }
        }

        // 阶段四: 标签整批替换
        match self
            .api
            .replace_tags(course_id, &session.course.tags)
            .await
        {
            Ok(()) => self.context.manager.record_success(),
            Err(e) => self
                .context
                .manager
                .record_failure("课程标签", &e.to_string()),
        }

        // 阶段五: 课程资源与课时附件
        self.persist_resources(session, course_id).await?;

        let report = self.context.manager.snapshot(Some(course_id));
        self.context.manager.print_report();
        Ok(report)
    }

    /// 收集所有待上传的课时正文文件并发上传，返回上传失败的课时 ID 集合。
    async fn upload_lesson_content(
        &self,
        session: &mut EditorSession,
    ) -> AppResult<HashSet<EntityId>> {
        let mut tasks = Vec::new();
        for section in session.sections_in_order() {
            for lesson in session.lessons_of(&section.id) {
                if let Some(path) = lesson.content.pending_upload() {
                    tasks.push(UploadTask::from_path(
                        lesson.id.clone(),
                        UploadKind::LessonContent,
                        path,
                    ));
                }
            }
        }
        if tasks.is_empty() {
            return Ok(HashSet::new());
        }
        info!("需要上传 {} 个课时内容文件", tasks.len());

        let outcomes = execute_uploads(&self.context, self.api.clone(), tasks).await?;
        let mut failed = HashSet::new();
        for outcome in outcomes {
            match outcome.file_url {
                Some(url) => session.resolve_lesson_content_upload(&outcome.resource_id, url),
                None => {
                    failed.insert(outcome.resource_id);
                }
            }
        }
        Ok(failed)
    }

    async fn persist_course(&self, session: &mut EditorSession) -> AppResult<u64> {
        let payload = course_payload(&session.course)?;
        let result = match session.course.id.as_canonical() {
            Some(id) => self.api.update_course(id, &payload).await,
            None => self.api.create_course(&payload).await,
        };
        let id = result.map_err(|e| wrap_persistence("课程", &session.course.title, e))?;
        session.reconcile_course(id);
        Ok(id)
    }

    async fn persist_section(
        &self,
        session: &mut EditorSession,
        course_id: u64,
        section: &Section,
    ) -> AppResult<u64> {
        let payload = SectionPayload {
            title: section.title.clone(),
            description: section.description.clone(),
            order: section.order,
        };
        match section.id.as_canonical() {
            Some(sid) => {
                self.api
                    .update_section(course_id, sid, &payload)
                    .await
                    .map_err(|e| wrap_persistence("章节", &section.title, e))?;
                Ok(sid)
            }
            None => {
                let sid = self
                    .api
                    .add_section(course_id, &payload)
                    .await
                    .map_err(|e| wrap_persistence("章节", &section.title, e))?;
                session.reconcile_section(&section.id, sid);
                Ok(sid)
            }
        }
    }

    /// 提交某个已对账章节下的全部课时。单个课时失败只记录，不影响兄弟。
    async fn persist_section_lessons(
        &self,
        session: &mut EditorSession,
        course_id: u64,
        canonical_sid: u64,
        failed_content: &HashSet<EntityId>,
    ) {
        let section_key = EntityId::Canonical(canonical_sid);
        let lesson_ids = session
            .section(&section_key)
            .map(|s| s.lesson_ids.clone())
            .unwrap_or_default();
        for lesson_id in lesson_ids {
            let Some(lesson) = session.lesson(&lesson_id).cloned() else {
                continue;
            };
            let label = format!("课时 '{}'", lesson.title);
            if failed_content.contains(&lesson_id) {
                self.context
                    .manager
                    .record_failure(&label, "内容文件上传失败");
                continue;
            }
            match self
                .persist_lesson(session, course_id, canonical_sid, &lesson)
                .await
            {
                Ok(_) => self.context.manager.record_success(),
                Err(e) => self.context.manager.record_failure(&label, &e.to_string()),
            }
        }
    }

    async fn persist_lesson(
        &self,
        session: &mut EditorSession,
        course_id: u64,
        canonical_sid: u64,
        lesson: &Lesson,
    ) -> AppResult<u64> {
        let payload = LessonPayload {
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            content_type: lesson.content.kind().as_str().to_string(),
            content_url: lesson.content.content_url(),
            duration: lesson.duration_secs,
            preview: lesson.preview,
            order: lesson.order,
        };
        match lesson.id.as_canonical() {
            Some(lid) => {
                self.api
                    .update_lesson(course_id, canonical_sid, lid, &payload)
                    .await
                    .map_err(|e| wrap_persistence("课时", &lesson.title, e))?;
                Ok(lid)
            }
            None => {
                let lid = self
                    .api
                    .add_lesson(course_id, canonical_sid, &payload)
                    .await
                    .map_err(|e| wrap_persistence("课时", &lesson.title, e))?;
                session.reconcile_lesson(&EntityId::Canonical(canonical_sid), &lesson.id, lid);
                Ok(lid)
            }
        }
    }

    /// 上传并保存课程级资源与课时附件。LINK 资源跳过上传，
    /// 所属课时未完成对账的附件整体跳过。
    async fn persist_resources(
        &self,
        session: &mut EditorSession,
        course_id: u64,
    ) -> AppResult<()> {
        let mut ordered_ids: Vec<EntityId> = session.course.resource_ids.clone();
        for section in session.sections_in_order() {
            for lesson in session.lessons_of(&section.id) {
                ordered_ids.extend(lesson.attachment_ids.iter().cloned());
            }
        }
        if ordered_ids.is_empty() {
            return Ok(());
        }

        let mut tasks = Vec::new();
        for rid in &ordered_ids {
            let Some(resource) = session.resource(rid) else {
                continue;
            };
            if let Some(path) = resource.source.pending_upload() {
                let kind = match resource.owner {
                    ResourceOwner::Course => UploadKind::CourseResource,
                    ResourceOwner::Lesson(_) => UploadKind::LessonResource,
                };
                tasks.push(UploadTask::from_path(rid.clone(), kind, path));
            }
        }

        let mut upload_failed: HashSet<EntityId> = HashSet::new();
        if !tasks.is_empty() {
            let outcomes = execute_uploads(&self.context, self.api.clone(), tasks).await?;
            for outcome in outcomes {
                match outcome.file_url {
                    Some(url) => session.resolve_resource_upload(&outcome.resource_id, url),
                    None => {
                        upload_failed.insert(outcome.resource_id);
                    }
                }
            }
        }

        for rid in &ordered_ids {
            let Some(resource) = session.resource(rid).cloned() else {
                continue;
            };
            let label = format!("资源 '{}'", resource.title);
            if upload_failed.contains(rid) {
                self.context.manager.record_failure(&label, "文件上传失败");
                continue;
            }
            let Some(file_url) = resource.source.resolved_url().map(str::to_string) else {
                warn!("资源 '{}' 没有可用的文件地址，跳过保存。", resource.title);
                self.context
                    .manager
                    .record_failure(&label, "缺少可用的文件地址");
                continue;
            };
            let payload = ResourcePayload {
                title: resource.title.clone(),
                kind: resource.kind.as_str().to_string(),
                file_url,
                is_downloadable: resource.is_downloadable,
            };
            let result = match &resource.owner {
                ResourceOwner::Course => match resource.id.as_canonical() {
                    Some(id) => {
                        self.api
                            .update_course_resource(course_id, id, &payload)
                            .await
                    }
                    None => self.api.add_course_resource(course_id, &payload).await,
                },
                ResourceOwner::Lesson(lesson_id) => match lesson_id.as_canonical() {
                    // 子节点必须等父节点完成对账后才能提交
                    None => {
                        self.context.manager.record_skip(&label, "所属课时未保存");
                        continue;
                    }
                    Some(lid) => match resource.id.as_canonical() {
                        Some(id) => {
                            self.api
                                .update_lesson_resource(course_id, lid, id, &payload)
                                .await
                        }
                        None => self.api.add_lesson_resource(course_id, lid, &payload).await,
                    },
                },
            };
            match result {
                Ok(id) => {
                    if resource.id.is_temp() {
                        session.reconcile_resource(rid, id);
                    }
                    self.context.manager.record_success();
                }
                Err(e) => self.context.manager.record_failure(&label, &e.to_string()),
            }
        }
        Ok(())
    }
}

fn course_payload(course: &CourseDraft) -> AppResult<CoursePayload> {
    let category_id = course
        .category_id
        .ok_or_else(|| AppError::validation("category", "提交前必须选择课程分类"))?;
    Ok(CoursePayload {
        title: course.title.clone(),
        description: course.description.clone(),
        category_id,
        level: course.level.as_str().to_string(),
        language: course.language.clone(),
        price: course.price,
        discount_price: course.discount_price,
    })
}

/// 远端调用失败统一包装为持久化错误；Token 问题保持原样向上传递。
fn wrap_persistence(entity: &'static str, label: &str, source: AppError) -> AppError {
    match source {
        AppError::TokenInvalid | AppError::TokenMissing => source,
        other => AppError::Persistence {
            entity,
            label: label.to_string(),
            reason: other.to_string(),
        },
    }
}
