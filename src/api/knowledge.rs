use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::models::{ApiResponse, KnowledgeBase, KnowledgeTag, UploadFile, UploadProgress};
use crate::services::ApiClient;

/// 上传进度回调
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// 流式上传的分片大小
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Serialize)]
struct DeleteKnowledgeRequest<'a> {
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDocumentRequest<'a> {
    knowledge_base_id: &'a str,
}

/// 获取知识库标签列表
pub async fn get_rag_tags(client: &ApiClient) -> Result<ApiResponse<Vec<String>>> {
    client.get("/api/v1/rag/tags").await
}

/// 获取知识库标签列表（管理页变体，带来源与更新时间）
pub async fn get_knowledge_tags(client: &ApiClient) -> Result<ApiResponse<Vec<KnowledgeTag>>> {
    client.get("/api/v1/ollama/knowledge/tags").await
}

/// 获取知识库列表
pub async fn get_knowledge_list(client: &ApiClient) -> Result<ApiResponse<Vec<KnowledgeBase>>> {
    client.get("/api/v1/rag/knowledge/list").await
}

/// 创建知识库
pub async fn create_knowledge(
    client: &ApiClient,
    knowledge_base: &KnowledgeBase,
) -> Result<ApiResponse<KnowledgeBase>> {
    client.post("/api/v1/rag/knowledge/create", knowledge_base).await
}

/// 更新知识库
pub async fn update_knowledge(
    client: &ApiClient,
    knowledge_base: &KnowledgeBase,
) -> Result<ApiResponse<KnowledgeBase>> {
    client.post("/api/v1/rag/knowledge/update", knowledge_base).await
}

/// 删除知识库
pub async fn delete_knowledge(client: &ApiClient, id: &str) -> Result<ApiResponse<Value>> {
    client
        .post("/api/v1/rag/knowledge/delete", &DeleteKnowledgeRequest { id })
        .await
}

/// 获取知识库详情
pub async fn get_knowledge_detail(
    client: &ApiClient,
    id: &str,
) -> Result<ApiResponse<KnowledgeBase>> {
    client.get(&format!("/api/v1/rag/knowledge/{id}")).await
}

/// 获取知识库文件列表
pub async fn get_knowledge_files<Q: Serialize + ?Sized>(
    client: &ApiClient,
    knowledge_base_id: &str,
    params: &Q,
) -> Result<ApiResponse<Value>> {
    client
        .get_with_query(
            &format!("/api/v1/rag/knowledge/{knowledge_base_id}/files"),
            params,
        )
        .await
}

/// 删除知识库标签
pub async fn delete_knowledge_tag(
    client: &ApiClient,
    tag_name: &str,
) -> Result<ApiResponse<String>> {
    client
        .delete(&format!("/api/v1/ollama/knowledge/tag/{tag_name}"))
        .await
}

/// 删除知识库文档
pub async fn delete_knowledge_file(
    client: &ApiClient,
    knowledge_base_id: &str,
) -> Result<ApiResponse<i64>> {
    client
        .post(
            "/api/v1/document/delete",
            &DeleteDocumentRequest { knowledge_base_id },
        )
        .await
}

/// 上传单个文件到知识库，可选进度回调
pub async fn upload_file(
    client: &ApiClient,
    knowledge_base_id: &str,
    file: UploadFile,
    on_progress: Option<ProgressCallback>,
) -> Result<ApiResponse<Value>> {
    let form = Form::new()
        .text("knowledgeBaseId", knowledge_base_id.to_string())
        .part("file", file_part(file, on_progress)?);

    client.post_multipart("/api/v1/document/upload", form).await
}

/// 批量上传文件到知识库（标签字段 + 多个文件分片）
pub async fn upload_files(
    client: &ApiClient,
    knowledge_base_id: &str,
    files: Vec<UploadFile>,
) -> Result<ApiResponse<Value>> {
    let mut form = Form::new().text("knowledgeBaseId", knowledge_base_id.to_string());
    for file in files {
        form = form.part("file", file_part(file, None)?);
    }

    client.post_multipart("/api/v1/document/upload", form).await
}

fn file_part(file: UploadFile, on_progress: Option<ProgressCallback>) -> Result<Part> {
    let mime = file.mime_type.clone();
    let part = match on_progress {
        Some(on_progress) => {
            let total = file.content.len() as u64;
            Part::stream_with_length(progress_body(file.content, total, on_progress), total)
                .file_name(file.file_name)
        }
        None => Part::bytes(file.content).file_name(file.file_name),
    };

    part.mime_str(&mime)
        .map_err(|e| ClientError::Validation(format!("Invalid MIME type: {e}")))
}

/// 将文件内容包成分片流，边发送边回调进度。
/// total 为 0 时不产生任何回调，percent 始终落在 [0, 100]。
fn progress_body(content: Vec<u8>, total: u64, on_progress: ProgressCallback) -> reqwest::Body {
    let chunks: Vec<Vec<u8>> = content.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let mut loaded: u64 = 0;

    reqwest::Body::wrap_stream(futures::stream::iter(chunks.into_iter().map(move |chunk| {
        loaded += chunk.len() as u64;
        if total > 0 {
            on_progress(UploadProgress {
                loaded,
                total,
                percent: loaded as f64 / total as f64 * 100.0,
            });
        }
        Ok::<Vec<u8>, std::io::Error>(chunk)
    })))
}
