use core_config::AppInfo;
use mailer::{Dispatcher, ResendProvider};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub app: AppInfo,
    pub dispatcher: Arc<Dispatcher>,
    /// Present only when `RESEND_API_KEY` is set
    pub resend: Option<Arc<ResendProvider>>,
    pub resend_from: String,
}

impl AppState {
    pub fn new(app: AppInfo, dispatcher: Dispatcher) -> Self {
        Self {
            app,
            dispatcher: Arc::new(dispatcher),
            resend: None,
            resend_from: crate::config::DEFAULT_RESEND_FROM.to_string(),
        }
    }

    pub fn with_resend(mut self, provider: ResendProvider, from: impl Into<String>) -> Self {
        self.resend = Some(Arc::new(provider));
        self.resend_from = from.into();
        self
    }
}
