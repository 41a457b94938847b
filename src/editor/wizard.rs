// src/editor/wizard.rs

use super::EditorSession;
use crate::{AuthorJobContext, error::*, sync::{CourseSynchronizer, SyncReport}};
use log::info;

/// 创建课程向导的线性步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    Content,
    Details,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BasicInfo,
        WizardStep::Content,
        WizardStep::Details,
        WizardStep::Review,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "基本信息",
            WizardStep::Content => "课程内容",
            WizardStep::Details => "详细设置",
            WizardStep::Review => "预览与提交",
        }
    }
}

/// 向导状态机。步骤切换本身不设门槛（与来源行为一致），
/// 完整校验集中在最后一步的提交动作上。
#[derive(Debug, Clone)]
pub struct AuthorWizard {
    current: usize,
}

impl Default for AuthorWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorWizard {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.current]
    }

    /// 1 起始的步骤编号，供界面显示 "第 x / N 步"。
    pub fn step_number(&self) -> usize {
        self.current + 1
    }

    pub fn total_steps(&self) -> usize {
        WizardStep::ALL.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == WizardStep::ALL.len()
    }

    /// 前进一步，已在最后一步时保持不动。
    pub fn next(&mut self) -> WizardStep {
        if self.current + 1 < WizardStep::ALL.len() {
            self.current += 1;
        }
        self.current_step()
    }

    pub fn back(&mut self) -> WizardStep {
        self.current = self.current.saturating_sub(1);
        self.current_step()
    }

    /// 终点动作：仅允许在最后一步触发同步引擎。
    pub async fn submit(
        &self,
        context: &AuthorJobContext,
        session: &mut EditorSession,
    ) -> AppResult<SyncReport> {
        if !self.is_last() {
            return Err(AppError::validation(
                "step",
                format!(
                    "仅允许在 '{}' 步骤提交，当前处于 '{}'",
                    WizardStep::Review.label(),
                    self.current_step().label()
                ),
            ));
        }
        info!("向导进入提交流程: '{}'", session.course.title);
        CourseSynchronizer::new(context.clone()).run(session).await
    }
}
