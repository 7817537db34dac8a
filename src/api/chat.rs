use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{ApiResponse, ChatMessage, Role, Source};
use crate::services::ApiClient;

/// 默认采样温度
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    temperature: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RagChatRequest<'a> {
    message: &'a str,
    knowledge_base_id: &'a str,
    temperature: f64,
}

/// 获取支持的模型列表
pub async fn get_models(client: &ApiClient) -> Result<ApiResponse<Value>> {
    client.get("/api/v1/ai/ollama/models").await
}

/// 发送普通聊天请求
pub async fn send_message(
    client: &ApiClient,
    message: &str,
    temperature: Option<f64>,
) -> Result<ApiResponse<String>> {
    let request = ChatRequest {
        message,
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };
    client.post("/api/v1/rag/chat", &request).await
}

/// 直接调用 Ollama 生成接口
pub async fn send_direct_ollama_message<B: Serialize + ?Sized>(
    client: &ApiClient,
    data: &B,
) -> Result<ApiResponse<String>> {
    client.post("/api/v1/ai/ollama/direct_generate", data).await
}

/// 使用 deepseek 发送消息
pub async fn send_deepseek_message(
    client: &ApiClient,
    message: &str,
    temperature: Option<f64>,
) -> Result<ApiResponse<String>> {
    let request = ChatRequest {
        message,
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };
    client.post("/api/v1/ai/deepseek/chat", &request).await
}

/// 使用 chatglm 发送消息
pub async fn send_chatglm_message(
    client: &ApiClient,
    message: &str,
    temperature: Option<f64>,
) -> Result<ApiResponse<String>> {
    let request = ChatRequest {
        message,
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };
    client.post("/api/v1/ai/chatglm/chat", &request).await
}

/// 基于知识库的 RAG 聊天
pub async fn send_rag_message(
    client: &ApiClient,
    message: &str,
    knowledge_base_id: &str,
    temperature: Option<f64>,
) -> Result<ApiResponse<Value>> {
    let request = RagChatRequest {
        message,
        knowledge_base_id,
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };
    client.post("/api/v1/rag/v2/chat", &request).await
}

/// 获取聊天历史记录
pub async fn get_chat_history<Q: Serialize + ?Sized>(
    client: &ApiClient,
    params: &Q,
) -> Result<ApiResponse<Value>> {
    client.get_with_query("/api/v1/chat/history", params).await
}

/// 获取聊天详情
pub async fn get_chat_detail(client: &ApiClient, id: &str) -> Result<ApiResponse<Value>> {
    client.get(&format!("/api/v1/chat/{id}")).await
}

/// 创建新聊天
pub async fn create_chat<B: Serialize + ?Sized>(
    client: &ApiClient,
    data: &B,
) -> Result<ApiResponse<Value>> {
    client.post("/api/v1/chat", data).await
}

/// 更新聊天信息
pub async fn update_chat<B: Serialize + ?Sized>(
    client: &ApiClient,
    data: &B,
) -> Result<ApiResponse<Value>> {
    client.put("/api/v1/chat", data).await
}

/// 删除聊天
pub async fn delete_chat<B: Serialize + ?Sized>(
    client: &ApiClient,
    data: &B,
) -> Result<ApiResponse<Value>> {
    client.delete_json("/api/v1/chat", data).await
}

/// 生成一条聊天消息（客户端本地构造，带当前毫秒时间戳）
pub fn create_chat_message(role: Role, content: impl Into<String>, sources: Vec<Source>) -> ChatMessage {
    ChatMessage {
        role,
        content: content.into(),
        sources,
        timestamp: epoch_millis(),
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// 增强生成的回答：在末尾追加引用来源段落。
/// 超过 50 字的摘录截断并补 `...`，空来源时原样返回。
pub fn enhance_answer_with_sources(answer: &str, sources: &[Source]) -> String {
    if sources.is_empty() {
        return answer.to_string();
    }

    let mut enhanced = format!("{answer}\n\n参考来源：\n");

    for (index, source) in sources.iter().enumerate() {
        enhanced.push_str(&format!("{}. {}\n", index + 1, source.title));
        if let Some(content) = source.content.as_deref().filter(|content| !content.is_empty()) {
            let excerpt: String = if content.chars().count() > 50 {
                let head: String = content.chars().take(50).collect();
                format!("{head}...")
            } else {
                content.to_string()
            };
            enhanced.push_str(&format!("   {excerpt}\n"));
        }
    }

    enhanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn enhance_is_noop_for_empty_sources() {
        assert_eq!(enhance_answer_with_sources("A", &[]), "A");
    }

    #[test]
    fn enhance_truncates_long_excerpts_to_50_chars() {
        let content: String = "0123456789".repeat(6); // 60 字符
        let sources = vec![Source {
            title: "T".to_string(),
            content: Some(content),
        }];

        let enhanced = enhance_answer_with_sources("A", &sources);
        let expected = format!(
            "A\n\n参考来源：\n1. T\n   {}...\n",
            "0123456789".repeat(5)
        );
        assert_eq!(enhanced, expected);

        let excerpt_line = enhanced.lines().last().unwrap();
        let excerpt = excerpt_line.trim_start().trim_end_matches("...");
        assert_eq!(excerpt.chars().count(), 50);
    }

    #[test]
    fn enhance_keeps_short_excerpts_intact() {
        let sources = vec![Source {
            title: "短文档".to_string(),
            content: Some("恰好不超过五十个字".to_string()),
        }];

        let enhanced = enhance_answer_with_sources("回答", &sources);
        assert_eq!(enhanced, "回答\n\n参考来源：\n1. 短文档\n   恰好不超过五十个字\n");
    }

    #[test]
    fn enhance_skips_excerpt_when_content_missing() {
        let sources = vec![
            Source {
                title: "仅标题".to_string(),
                content: None,
            },
            Source {
                title: "空内容".to_string(),
                content: Some(String::new()),
            },
        ];

        let enhanced = enhance_answer_with_sources("A", &sources);
        assert_eq!(enhanced, "A\n\n参考来源：\n1. 仅标题\n2. 空内容\n");
    }

    #[test]
    fn chat_message_carries_timestamp_and_sources() {
        let message = create_chat_message(
            Role::Assistant,
            "你好",
            vec![Source {
                title: "doc".into(),
                content: None,
            }],
        );

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "你好");
        assert_eq!(message.sources.len(), 1);
        assert!(message.timestamp > 0);
    }

    #[tokio::test]
    async fn send_message_defaults_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rag/chat"))
            .and(body_json(json!({
                "message": "你好",
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "success",
                "data": "你好！"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri()));
        let res = send_message(&client, "你好", None).await.unwrap();
        assert_eq!(res.data.as_deref(), Some("你好！"));
    }

    #[tokio::test]
    async fn rag_message_carries_knowledge_base_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rag/v2/chat"))
            .and(body_json(json!({
                "message": "什么是RAG",
                "knowledgeBaseId": "kb-1",
                "temperature": 0.2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": { "answer": "..." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri()));
        let res = send_rag_message(&client, "什么是RAG", "kb-1", Some(0.2))
            .await
            .unwrap();
        assert!(res.is_success());
    }
}
