use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub booking_api_url: String,
    pub booking_username: String,
    pub booking_password: String,
    pub confirmed_status: String,
    pub reservations_from: String,
    pub reservations_to: String,
    pub llm_provider: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub properties_path: String,
    pub faq_path: String,
    pub support_contact: String,
    pub history_turns: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "concierge.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            booking_api_url: env::var("BOOKING_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            booking_username: env::var("BOOKING_USERNAME").unwrap_or_default(),
            booking_password: env::var("BOOKING_PASSWORD").unwrap_or_default(),
            confirmed_status: env::var("BOOKING_CONFIRMED_STATUS")
                .unwrap_or_else(|_| "confirmed".to_string()),
            reservations_from: env::var("RESERVATIONS_FROM")
                .unwrap_or_else(|_| "2023-01-01".to_string()),
            reservations_to: env::var("RESERVATIONS_TO")
                .unwrap_or_else(|_| "2026-01-01".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            properties_path: env::var("PROPERTIES_PATH")
                .unwrap_or_else(|_| "data/properties.json".to_string()),
            faq_path: env::var("FAQ_PATH").unwrap_or_else(|_| "data/faq.json".to_string()),
            support_contact: env::var("SUPPORT_CONTACT")
                .unwrap_or_else(|_| "+39 050 000 0000".to_string()),
            history_turns: env::var("HISTORY_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}
