// src/client.rs

use crate::{config::AppConfig, error::*};
use reqwest::{StatusCode, multipart::Form};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// 带指数退避重试的 HTTP 客户端，所有远端调用都经由它发出。
#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .pool_max_idle_per_host(config.max_workers * 3)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self { client })
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &T,
    ) -> AppResult<Value> {
        self.execute(url, self.client.post(url).bearer_auth(token).json(body))
            .await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &T,
    ) -> AppResult<Value> {
        self.execute(url, self.client.put(url).bearer_auth(token).json(body))
            .await
    }

    pub async fn post_multipart(&self, url: &str, token: &str, form: Form) -> AppResult<Value> {
        self.execute(url, self.client.post(url).bearer_auth(token).multipart(form))
            .await
    }

    /// 发送请求并解析 JSON 响应体。401/403 归一化为 TokenInvalid，
    /// 响应体解析失败时附带出错的 URL 以便排查。
    async fn execute(&self, url: &str, request: RequestBuilder) -> AppResult<Value> {
        let res = request.send().await?;
        if res.status() == StatusCode::UNAUTHORIZED || res.status() == StatusCode::FORBIDDEN {
            return Err(AppError::TokenInvalid);
        }
        let res = res.error_for_status()?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = res.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AppError::ApiParseFailed {
            url: url.to_string(),
            source: e,
        })
    }
}
