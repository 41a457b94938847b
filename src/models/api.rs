// src/models/api.rs

use serde::{Deserialize, Serialize};

// --- 请求载荷 ---

#[derive(Debug, Clone, Serialize)]
pub struct CoursePayload {
    pub title: String,
    pub description: String,
    pub category_id: u64,
    pub level: String,
    pub language: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonPayload {
    pub title: String,
    pub description: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    pub duration: u32,
    pub preview: bool,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagsPayload {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcePayload {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file_url: String,
    pub is_downloadable: bool,
}

// --- 响应结构体 ---

#[derive(Debug, Clone, Deserialize)]
pub struct IdResponse {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub file_url: String,
}
