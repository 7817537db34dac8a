//! 知识库管理页与 git 分析页的后端操作流。
//! 页面渲染不在本层，校验、确认与防重复触发在发请求前完成。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::api::git::{self, GitAnalyzeRequest};
use crate::api::knowledge;
use crate::error::{ClientError, Result};
use crate::models::{ApiResponse, KnowledgeTag, UploadFile};
use crate::services::ApiClient;

/// 危险操作的确认入口，由宿主 UI 注入（对话框、命令行询问等）
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// 单动作并发闸门：动作未结束前拒绝再次触发。
/// 占用成功返回守卫，守卫释放（drop）后闸门重新打开。
#[derive(Debug, Default)]
pub struct ActionGate {
    busy: AtomicBool,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<ActionGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(ActionGuard { gate: self })
        } else {
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub struct ActionGuard<'a> {
    gate: &'a ActionGate,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// 知识库管理页的操作集合
pub struct KnowledgeAdmin {
    client: Arc<ApiClient>,
    upload_gate: ActionGate,
    analyze_gate: ActionGate,
}

impl KnowledgeAdmin {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            upload_gate: ActionGate::new(),
            analyze_gate: ActionGate::new(),
        }
    }

    /// 刷新知识库标签列表
    pub async fn load_knowledge_tags(&self) -> Result<Vec<KnowledgeTag>> {
        let response = knowledge::get_knowledge_tags(self.client.as_ref()).await?;
        Ok(response.data.unwrap_or_default())
    }

    /// 上传文档到指定标签。必填项缺失时弹阻断提醒，不发起请求。
    pub async fn upload_documents(
        &self,
        tag_name: &str,
        files: Vec<UploadFile>,
    ) -> Result<ApiResponse<Value>> {
        if tag_name.trim().is_empty() || files.is_empty() {
            return Err(self.validation_error("Please enter tag name and select files"));
        }

        let _guard = self.upload_gate.try_begin().ok_or(ClientError::Busy)?;
        knowledge::upload_files(self.client.as_ref(), tag_name.trim(), files).await
    }

    /// 删除知识库标签。必须确认通过才发起 DELETE；取消不视为错误。
    pub async fn delete_tag(
        &self,
        tag_name: &str,
        confirm: &dyn Confirm,
    ) -> Result<Option<ApiResponse<String>>> {
        if !confirm.confirm(&format!("Are you sure you want to delete \"{tag_name}\"?")) {
            return Ok(None);
        }

        knowledge::delete_knowledge_tag(self.client.as_ref(), tag_name)
            .await
            .map(Some)
    }

    /// 分析 git 仓库。三个字段均必填，缺失时不发起请求。
    pub async fn analyze_repository(
        &self,
        request: &GitAnalyzeRequest,
    ) -> Result<ApiResponse<Value>> {
        if request.repo_url.trim().is_empty()
            || request.user_name.trim().is_empty()
            || request.token.trim().is_empty()
        {
            return Err(self.validation_error("Please fill in all required fields"));
        }

        let _guard = self.analyze_gate.try_begin().ok_or(ClientError::Busy)?;
        git::analyze_git_repository(self.client.as_ref(), request).await
    }

    fn validation_error(&self, message: &str) -> ClientError {
        self.client.notifier().alert(message);
        ClientError::Validation(message.to_string())
    }
}
