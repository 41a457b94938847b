// src/editor/reorder.rs

use super::EditorSession;
use crate::{error::*, models::EntityId};
use log::{debug, warn};

/// 一次拖拽产生的移动描述。判别式区分章节重排与课时重排；
/// 课时移动携带源/目标章节，跨章节移动不在支持范围内。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRequest {
    Section {
        from: usize,
        to: usize,
    },
    Lesson {
        from_section: EntityId,
        to_section: EntityId,
        from: usize,
        to: usize,
    },
}

/// 纯重排：源位置移除、目标位置插入，未触及的元素保持相对顺序。
fn shift(ids: &mut Vec<EntityId>, from: usize, to: usize) {
    let id = ids.remove(from);
    ids.insert(to, id);
}

impl EditorSession {
    /// 应用一次移动并重排受影响集合的 order 为 1..N。
    /// 返回 Ok(false) 表示无事发生（同位置拖放或跨章节移动）。
    pub fn apply_move(&mut self, request: &MoveRequest) -> AppResult<bool> {
        match request {
            MoveRequest::Section { from, to } => {
                let len = self.course.section_ids.len();
                if *from >= len || *to >= len {
                    return Err(AppError::validation(
                        "order",
                        format!("章节索引越界 (from={}, to={}, len={})", from, to, len),
                    ));
                }
                if from == to {
                    return Ok(false);
                }
                shift(&mut self.course.section_ids, *from, *to);
                self.renumber_sections();
                debug!("章节重排: {} -> {}", from, to);
                Ok(true)
            }
            MoveRequest::Lesson {
                from_section,
                to_section,
                from,
                to,
            } => {
                if from_section != to_section {
                    warn!(
                        "忽略跨章节的课时移动: {} -> {}",
                        from_section, to_section
                    );
                    return Ok(false);
                }
                let Some(section) = self.sections.get_mut(from_section) else {
                    return Err(AppError::validation(
                        "section",
                        format!("章节 '{}' 不存在", from_section),
                    ));
                };
                let len = section.lesson_ids.len();
                if *from >= len || *to >= len {
                    return Err(AppError::validation(
                        "order",
                        format!("课时索引越界 (from={}, to={}, len={})", from, to, len),
                    ));
                }
                if from == to {
                    return Ok(false);
                }
                shift(&mut section.lesson_ids, *from, *to);
                let section_id = from_section.clone();
                self.renumber_lessons(&section_id);
                debug!("章节 {} 内课时重排: {} -> {}", section_id, from, to);
                Ok(true)
            }
        }
    }
}
