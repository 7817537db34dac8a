use thiserror::Error;

/// 客户端统一错误类型
///
/// 所有错误均为终态：不重试、不降级，调用方拿到 `Err` 后自行分支处理
/// （例如上传失败时保留表单内容）。
#[derive(Debug, Error)]
pub enum ClientError {
    /// 网络层错误（无法连接、超时、DNS 失败等）
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// 后端响应码非成功，携带后端下发的提示文案
    #[error("{message}")]
    Api { code: String, message: String },

    /// 响应体为空或无法按统一包装解析
    #[error("{detail}")]
    Parse { status: u16, detail: String },

    /// 发起请求前的必填项校验失败，此时不会产生任何网络请求
    #[error("{0}")]
    Validation(String),

    /// 同一动作已有请求在途，拒绝重复触发
    #[error("操作进行中，请稍候")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ClientError>;
