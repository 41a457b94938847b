// src/lib.rs

pub mod client;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod remote;
pub mod symbols;
pub mod sync;
pub mod ui;
pub mod upload;
pub mod utils;

use crate::{
    client::RobustClient,
    config::AppConfig,
    error::AppResult,
    sync::SyncManager,
    upload::UploadManager,
};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

/// 一次提交作业的执行上下文，包含所有组件共享的状态与工具。
/// 编辑会话本身（EditorSession）与上下文分离：会话随编辑器打开/关闭
/// 创建与丢弃，上下文跨提交复用。
#[derive(Clone)]
pub struct AuthorJobContext {
    pub manager: SyncManager,
    pub uploads: UploadManager,
    pub token: Arc<TokioMutex<String>>,
    pub config: Arc<AppConfig>,
    pub http_client: Arc<RobustClient>,
}

impl AuthorJobContext {
    /// 构建上下文。Token 按 调用方参数 > 环境变量 > 本地配置文件 解析。
    pub fn new(config: Arc<AppConfig>, explicit_token: Option<&str>) -> AppResult<Self> {
        let (token_opt, source) = config::token::resolve_token(explicit_token);
        match &token_opt {
            Some(_) => info!("从 {} 加载 Access Token", source),
            None => warn!("未找到可用的 Access Token，提交将被拒绝"),
        }
        let http_client = Arc::new(RobustClient::new(config.clone())?);
        Ok(Self {
            manager: SyncManager::new(),
            uploads: UploadManager::new(),
            token: Arc::new(TokioMutex::new(token_opt.unwrap_or_default())),
            config,
            http_client,
        })
    }
}
