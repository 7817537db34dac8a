use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::ApiResponse;
use crate::services::notify::{LogNotifier, Notice, Notifier};

/// 网络层失败时的兜底文案
const NETWORK_ERROR: &str = "网络错误";

/// 请求拦截器：发送前的扩展点（预留请求头等配置）。
/// 拦截器失败时原样返回其错误，不做二次包装。
pub type RequestInterceptor =
    dyn Fn(RequestBuilder) -> Result<RequestBuilder> + Send + Sync;

/// 统一配置的 HTTP 客户端，所有接口封装共用同一实例。
///
/// 构造一次后按引用传入各接口函数；自身不含每次调用的可变状态，
/// 可被任意数量的并发调用共享。
pub struct ApiClient {
    client: Client,
    base_url: String,
    notifier: Arc<dyn Notifier>,
    request_interceptor: Option<Arc<RequestInterceptor>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        let client = build_http_client(&config);
        Self {
            client,
            base_url: config.api_base_url,
            notifier: Arc::new(LogNotifier),
            request_interceptor: None,
        }
    }

    /// 按环境变量配置构造
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    /// 注入提示出口（由宿主 UI 提供）
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// 注入请求拦截器
    pub fn with_request_interceptor(mut self, interceptor: Arc<RequestInterceptor>) -> Self {
        self.request_interceptor = Some(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("GET {url}");
        self.execute(self.client.get(&url)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("GET {url}");
        self.execute(self.client.get(&url).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("POST {url}");
        self.execute(self.client.post(&url).json(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("PUT {url}");
        self.execute(self.client.put(&url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("DELETE {url}");
        self.execute(self.client.delete(&url)).await
    }

    pub async fn delete_json<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("DELETE {url}");
        self.execute(self.client.delete(&url).json(body)).await
    }

    /// 表单编码请求（git 仓库分析）。
    /// 请求体用标准序列化器编码：键值对以 `&` 连接，无末尾分隔符。
    pub async fn post_form<T, B>(&self, path: &str, form: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| ClientError::Validation(format!("表单编码失败: {e}")))?;
        let url = self.url(path);
        debug!("POST {url}");
        self.execute(
            self.client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body),
        )
        .await
    }

    /// multipart 上传
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("POST {url}");
        self.execute(self.client.post(&url).multipart(form)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_request_interceptor(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.request_interceptor {
            Some(interceptor) => interceptor(request).map_err(|e| {
                error!("request error: {e}");
                e
            }),
            None => Ok(request),
        }
    }

    /// 发送请求并统一处理响应包装
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>> {
        let request = self.apply_request_interceptor(request)?;

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_error(e)),
        };

        let status = response.status();
        debug!("<- {} {}", status.as_u16(), response.url());

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.transport_error(e)),
        };

        if text.is_empty() {
            return Err(self.parse_error(
                status.as_u16(),
                format!("服务器响应为空，状态码: {}", status.as_u16()),
            ));
        }

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(envelope) => {
                if envelope.is_success() {
                    Ok(envelope)
                } else {
                    let message = envelope.error_message();
                    error!("api error: {message}");
                    self.notifier.notify(Notice::error(message.clone()));
                    Err(ClientError::Api {
                        code: envelope.code_text(),
                        message,
                    })
                }
            }
            Err(e) => Err(self.parse_error(
                status.as_u16(),
                format!(
                    "解析响应失败: {}。状态: {}。响应: {}",
                    e,
                    status.as_u16(),
                    truncate(&text, 500)
                ),
            )),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        error!("request error: {err}");
        let text = err.to_string();
        let message = if text.is_empty() {
            NETWORK_ERROR.to_string()
        } else {
            text
        };
        self.notifier.notify(Notice::error(message));
        ClientError::Transport(err)
    }

    fn parse_error(&self, status: u16, detail: String) -> ClientError {
        error!("{detail}");
        self.notifier.notify(Notice::error(NETWORK_ERROR));
        ClientError::Parse { status, detail }
    }
}

fn is_localhost_url(api_base_url: &str) -> bool {
    let parsed = match Url::parse(api_base_url) {
        Ok(v) => v,
        Err(_) => return false,
    };

    matches!(
        parsed.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("::1")
    )
}

/// 统一构建 HTTP client：
/// - 对 localhost/127.0.0.1/::1 自动绕过系统/环境代理，避免被全局代理截胡导致 503
/// - 其他地址保持 reqwest 默认行为（允许使用环境代理）
fn build_http_client(config: &ClientConfig) -> Client {
    let mut builder = Client::builder().timeout(config.timeout);

    if is_localhost_url(&config.api_base_url) {
        builder = builder.no_proxy();
    }

    builder.build().unwrap_or_else(|_| Client::new())
}

/// 截断响应体用于日志，避免在多字节字符中间切断
fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
