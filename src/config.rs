use std::time::Duration;

/// 默认后端地址，可通过环境变量 API_BASE_URL 覆盖
pub const DEFAULT_API_URL: &str = "http://localhost:8090";

/// 请求超时时间
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// 客户端配置，构造一次后随 `ApiClient` 注入各处
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            api_base_url,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// 从环境变量读取配置，未设置时使用默认地址
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_base_url)
    }

    /// 文档上传完整地址（部分页面直接取用）
    pub fn file_upload_url(&self) -> String {
        format!("{}/api/v1/document/upload", self.api_base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
