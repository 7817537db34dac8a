pub mod api_client;
pub mod notify;

pub use api_client::ApiClient;
pub use notify::{LogNotifier, Notice, Notifier, NOTICE_DURATION};
