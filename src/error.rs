// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("认证失败 (Token 无效或已过期)")]
    TokenInvalid,
    #[error("未提供 Access Token，无法提交课程")]
    TokenMissing,
    #[error("字段校验失败 [{field}]: {message}")]
    Validation { field: String, message: String },
    #[error("文件 '{filename}' 上传失败: {reason}")]
    Upload { filename: String, reason: String },
    #[error("远端保存失败 ({entity} '{label}'): {reason}")]
    Persistence {
        entity: &'static str,
        label: String,
        reason: String,
    },
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("无法解析来自 '{url}' 的API响应: {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 构造一个字段级校验错误，由本地变更引擎同步抛出，永远不会到达网络层。
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
