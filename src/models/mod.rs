use serde::{Deserialize, Serialize};

/// 响应码非成功且后端未携带文案时的兜底提示
pub const GENERIC_ERROR: &str = "Error";

/// 响应码，后端存在字符串（"0000"）与数字（200）两种形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Text(String),
    Number(i64),
}

impl ResponseCode {
    /// 统一成功判定："0000"、空串、0、200 视为成功，其余一律失败
    pub fn is_success(&self) -> bool {
        match self {
            ResponseCode::Text(code) => code == "0000" || code.is_empty(),
            ResponseCode::Number(code) => *code == 0 || *code == 200,
        }
    }
}

/// 后端统一响应包装
///
/// 成功时整个包装原样返回，`data` 由调用方自行取用。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ResponseCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// code 缺省视为成功
    pub fn is_success(&self) -> bool {
        self.code.as_ref().map(ResponseCode::is_success).unwrap_or(true)
    }

    /// 失败时的用户可见文案：info 优先，其次 message，最后兜底
    pub fn error_message(&self) -> String {
        self.info
            .clone()
            .filter(|text| !text.is_empty())
            .or_else(|| self.message.clone().filter(|text| !text.is_empty()))
            .unwrap_or_else(|| GENERIC_ERROR.to_string())
    }

    /// 响应码的文本形式，用于日志与错误携带
    pub fn code_text(&self) -> String {
        match &self.code {
            Some(ResponseCode::Text(code)) => code.clone(),
            Some(ResponseCode::Number(code)) => code.to_string(),
            None => String::new(),
        }
    }
}

/// 聊天消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 引用来源，随消息一同展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// 聊天消息，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// 毫秒时间戳
    pub timestamp: i64,
}

/// 单次会话内累积的消息列表（仅内存态，不落盘）
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 知识库标签
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeTag {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
}

/// 知识库
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    /// 创建时由后端分配
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// 待上传文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: String,
}

/// 上传进度，仅在总大小已知（total > 0）时回调
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
    pub percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(body: &str) -> ApiResponse<serde_json::Value> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn success_codes() {
        assert!(envelope(r#"{"code":"0000","data":[]}"#).is_success());
        assert!(envelope(r#"{"code":0}"#).is_success());
        assert!(envelope(r#"{"code":200,"message":"success"}"#).is_success());
        assert!(envelope(r#"{"code":""}"#).is_success());
        assert!(envelope(r#"{"data":{}}"#).is_success());
    }

    #[test]
    fn failure_codes() {
        assert!(!envelope(r#"{"code":"1001"}"#).is_success());
        assert!(!envelope(r#"{"code":500,"message":"boom"}"#).is_success());
        // 字符串 "0" 与数字 0 不同形，不视为成功
        assert!(!envelope(r#"{"code":"0"}"#).is_success());
        assert!(!envelope(r#"{"code":1}"#).is_success());
    }

    #[test]
    fn error_message_prefers_info_then_message() {
        let res = envelope(r#"{"code":"1001","info":"查询失败","message":"ignored"}"#);
        assert_eq!(res.error_message(), "查询失败");

        let res = envelope(r#"{"code":500,"message":"聊天失败"}"#);
        assert_eq!(res.error_message(), "聊天失败");

        let res = envelope(r#"{"code":"1001"}"#);
        assert_eq!(res.error_message(), GENERIC_ERROR);

        // 空串不算有效文案
        let res = envelope(r#"{"code":"1001","info":"","message":"后端异常"}"#);
        assert_eq!(res.error_message(), "后端异常");
    }

    #[test]
    fn chat_session_accumulates_messages() {
        let mut session = ChatSession::new();
        assert!(session.is_empty());

        session.push(ChatMessage {
            role: Role::User,
            content: "你好".into(),
            sources: Vec::new(),
            timestamp: 1,
        });
        session.push(ChatMessage {
            role: Role::Assistant,
            content: "你好！".into(),
            sources: Vec::new(),
            timestamp: 2,
        });

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
    }

    #[test]
    fn decodes_both_code_shapes() {
        let res = envelope(r#"{"code":"0000","info":"调用成功","data":["study","repo"]}"#);
        assert_eq!(res.code_text(), "0000");
        assert_eq!(res.data.unwrap().as_array().unwrap().len(), 2);

        let res = envelope(r#"{"code":200,"message":"success","data":"ok"}"#);
        assert_eq!(res.code_text(), "200");
    }
}
