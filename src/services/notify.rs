use std::time::Duration;

/// 瞬时提示展示时长
pub const NOTICE_DURATION: Duration = Duration::from_millis(5_000);

/// 一条用户可见的瞬时错误提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: NOTICE_DURATION,
        }
    }
}

/// 提示出口，由宿主 UI 注入具体实现
pub trait Notifier: Send + Sync {
    /// 瞬时提示，展示后自动消失
    fn notify(&self, notice: Notice);

    /// 阻断式提醒（校验失败等需要用户确认的场景）
    fn alert(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}

/// 默认实现：没有 UI 时仅记录日志
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::error!("{}", notice.message);
    }
}
