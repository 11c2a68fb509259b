use dotenvy::dotenv;
use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub embed_model: String,
    pub temperature: f32,
    pub db_path: String,
    pub docs_path: String,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        Self {
            api_base: env::var("COPILOT_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: env::var("COPILOT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            embed_model: env::var("COPILOT_EMBED_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string()),
            temperature: env::var("COPILOT_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TEMPERATURE),
            db_path: env::var("COPILOT_DB_PATH")
                .unwrap_or_else(|_| "copilot_index.db".to_string()),
            docs_path: env::var("COPILOT_DOCS_PATH").unwrap_or_else(|_| "docs".to_string()),
        }
    }
}
