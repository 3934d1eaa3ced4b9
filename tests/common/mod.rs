use chatline::api::{LoginResponse, User};
use chatline::config::ApiConfig;
use chatline::session::SessionContext;
use chatline::storage::SqliteStorage;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_session() -> (SessionContext, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("session.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (SessionContext::new(storage), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    }
}

#[allow(dead_code)]
pub fn login_response(token: &str) -> LoginResponse {
    LoginResponse {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
        user: User {
            id: "u1".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
        },
    }
}
