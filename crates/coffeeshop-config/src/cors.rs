use std::env;

use crate::split_list;

/// Origins of the bundled frontends (Ionic dev server and Angular).
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8100,http://localhost:4200";

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        env::var("ALLOWED_ORIGINS")
            .map(|raw| Self {
                allowed_origins: split_list(&raw),
            })
            .unwrap_or_default()
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}
