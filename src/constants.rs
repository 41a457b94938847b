// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const APP_NAME: &str = "course-studio";
pub const CONFIG_DIR_NAME: &str = ".course-studio";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "course-studio.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const MAX_FILENAME_BYTES: usize = 200;
pub const USER_AGENT: &str = concat!("course-studio/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_API_ORIGIN: &str = "https://api.coursestudio.cn";
pub const DEFAULT_LANGUAGE: &str = "zh-CN";
pub const TOKEN_ENV_VAR: &str = "COURSE_STUDIO_TOKEN";

/// 客户端临时标识符的前缀，服务端下发的正式 ID 是纯数字。
pub mod temp_id {
    pub const COURSE: &str = "course";
    pub const SECTION: &str = "section";
    pub const LESSON: &str = "lesson";
    pub const RESOURCE: &str = "resource";
}

pub mod api {
    /// URL 模板键，模板本体在配置文件中，支持 {origin}/{course_id} 等占位符。
    pub mod endpoints {
        pub const COURSE_CREATE: &str = "COURSE_CREATE";
        pub const COURSE_UPDATE: &str = "COURSE_UPDATE";
        pub const SECTION_CREATE: &str = "SECTION_CREATE";
        pub const SECTION_UPDATE: &str = "SECTION_UPDATE";
        pub const LESSON_CREATE: &str = "LESSON_CREATE";
        pub const LESSON_UPDATE: &str = "LESSON_UPDATE";
        pub const TAGS_REPLACE: &str = "TAGS_REPLACE";
        pub const COURSE_RESOURCE_CREATE: &str = "COURSE_RESOURCE_CREATE";
        pub const COURSE_RESOURCE_UPDATE: &str = "COURSE_RESOURCE_UPDATE";
        pub const LESSON_RESOURCE_CREATE: &str = "LESSON_RESOURCE_CREATE";
        pub const LESSON_RESOURCE_UPDATE: &str = "LESSON_RESOURCE_UPDATE";
        pub const UPLOAD: &str = "UPLOAD";
    }

    /// 上传接口的存储桶标识，区分课程资源、课时附件与课时正文文件。
    pub mod upload_kinds {
        pub const COURSE_RESOURCE: &str = "course-resource";
        pub const LESSON_RESOURCE: &str = "lesson-resource";
        pub const LESSON_CONTENT: &str = "lesson-content";
    }
}
