// config.rs
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tickets_key: String,
    pub session_key: String,
}

impl Config {
    pub fn init() -> Config {
        let data_dir = std::env::var("CAMPUSFIX_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string());
        let tickets_key = std::env::var("CAMPUSFIX_TICKETS_KEY")
            .unwrap_or_else(|_| "campusfix_tickets".to_string());
        let session_key = std::env::var("CAMPUSFIX_SESSION_KEY")
            .unwrap_or_else(|_| "campusfix_user".to_string());

        Config {
            data_dir: PathBuf::from(data_dir),
            tickets_key,
            session_key,
        }
    }
}
