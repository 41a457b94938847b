// src/config.rs

pub mod token;

use self::token::load_or_create_external_config;
use crate::{constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_workers: Option<usize>,
}

/// 落盘在 `~/.course-studio/config.json` 的外部配置，首次运行时自动生成默认值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accesstoken: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_origin: Option<String>,
    pub url_templates: HashMap<String, String>,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        use constants::api::endpoints as ep;
        let url_templates = HashMap::from([
            (ep::COURSE_CREATE.into(), "{origin}/api/v1/courses".into()),
            (ep::COURSE_UPDATE.into(), "{origin}/api/v1/courses/{course_id}".into()),
            (ep::SECTION_CREATE.into(), "{origin}/api/v1/courses/{course_id}/sections".into()),
            (ep::SECTION_UPDATE.into(), "{origin}/api/v1/courses/{course_id}/sections/{section_id}".into()),
            (ep::LESSON_CREATE.into(), "{origin}/api/v1/courses/{course_id}/sections/{section_id}/lessons".into()),
            (ep::LESSON_UPDATE.into(), "{origin}/api/v1/courses/{course_id}/sections/{section_id}/lessons/{lesson_id}".into()),
            (ep::TAGS_REPLACE.into(), "{origin}/api/v1/courses/{course_id}/tags".into()),
            (ep::COURSE_RESOURCE_CREATE.into(), "{origin}/api/v1/courses/{course_id}/resources".into()),
            (ep::COURSE_RESOURCE_UPDATE.into(), "{origin}/api/v1/courses/{course_id}/resources/{resource_id}".into()),
            (ep::LESSON_RESOURCE_CREATE.into(), "{origin}/api/v1/courses/{course_id}/lessons/{lesson_id}/resources".into()),
            (ep::LESSON_RESOURCE_UPDATE.into(), "{origin}/api/v1/courses/{course_id}/lessons/{lesson_id}/resources/{resource_id}".into()),
            (ep::UPLOAD.into(), "{origin}/api/v1/uploads/{kind}".into()),
        ]);

        // 为 NetworkConfig 提供一组稳健的默认值
        let network = NetworkConfig {
            connect_timeout_secs: Some(10),
            timeout_secs: Some(60),
            max_retries: Some(3),
            max_workers: Some(5),
        };

        Self {
            accesstoken: None,
            network,
            api_origin: None,
            url_templates,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_workers: usize,
    pub api_origin: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub url_templates: HashMap<String, String>,
}

impl AppConfig {
    pub fn new() -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        Ok(Self {
            max_workers: external_config.network.max_workers.unwrap_or(5),
            api_origin: external_config
                .api_origin
                .unwrap_or_else(|| constants::DEFAULT_API_ORIGIN.to_string()),
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(60)),
            max_retries: external_config.network.max_retries.unwrap_or(3),
            url_templates: external_config.url_templates,
        })
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            api_origin: "http://127.0.0.1:1".to_string(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            url_templates: ExternalConfig::default_app_config().url_templates,
        }
    }
}
