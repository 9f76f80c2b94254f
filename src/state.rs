use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::booking::BookingGateway;
use crate::services::knowledge::KnowledgeBase;
use crate::services::sessions::{PhoneLocks, SessionStore};

pub struct AppState {
    pub config: AppConfig,
    pub gateway: Box<dyn BookingGateway>,
    pub knowledge: KnowledgeBase,
    pub llm: Box<dyn LlmProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub phone_locks: PhoneLocks,
}
