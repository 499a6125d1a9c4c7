use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub token_path: String,
    pub credentials_path: String,
    pub calendar_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let db_path = env::var("COURSECAL_DB_PATH").unwrap_or("classes.sql".to_string());
        let token_path = env::var("COURSECAL_TOKEN_PATH").unwrap_or("token.json".to_string());
        let credentials_path =
            env::var("COURSECAL_CREDENTIALS_PATH").unwrap_or("credentials.json".to_string());
        let calendar_id = env::var("COURSECAL_CALENDAR_ID").unwrap_or("primary".to_string());

        Self {
            db_path,
            token_path,
            credentials_path,
            calendar_id,
        }
    }
}
