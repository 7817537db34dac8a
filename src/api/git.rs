use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::ApiResponse;
use crate::services::ApiClient;

/// git 仓库分析请求参数，按表单编码提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitAnalyzeRequest {
    pub repo_url: String,
    pub user_name: String,
    pub token: String,
}

/// 分析 Git 仓库
pub async fn analyze_git_repository(
    client: &ApiClient,
    request: &GitAnalyzeRequest,
) -> Result<ApiResponse<Value>> {
    client
        .post_form("/api/v1/ai/ollama/analyze_git_repository", request)
        .await
}

/// 分析 GitHub 仓库
pub async fn analyze_github_repository(
    client: &ApiClient,
    request: &GitAnalyzeRequest,
) -> Result<ApiResponse<Value>> {
    client
        .post_form("/api/v1/ai/ollama/analyze_github_repository", request)
        .await
}
