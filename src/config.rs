use std::env;
use std::path::PathBuf;

use crate::models::{FrontendSettings, UiSettings};

#[derive(Clone, Debug)]
pub struct UiConfig {
    pub title: String,
    pub chat_title: String,
    pub chat_description: String,
    pub show_share_button: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub auth_enabled: bool,
    pub feedback_enabled: bool,
    pub sanitize_answer: bool,
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default)
        };

        Self {
            bind_addr: text("CHAT_ANSWERS_BIND", "127.0.0.1:8080"),
            static_dir: PathBuf::from(text("CHAT_ANSWERS_STATIC_DIR", "./static")),
            auth_enabled: flag("AUTH_ENABLED", false),
            feedback_enabled: flag("FEEDBACK_ENABLED", true),
            sanitize_answer: flag("SANITIZE_ANSWER", true),
            ui: UiConfig {
                title: text("UI_TITLE", "Contoso"),
                chat_title: text("UI_CHAT_TITLE", "Start chatting"),
                chat_description: text(
                    "UI_CHAT_DESCRIPTION",
                    "This chatbot is configured to answer your questions",
                ),
                show_share_button: flag("UI_SHOW_SHARE_BUTTON", true),
            },
        }
    }

    pub fn frontend_settings(&self) -> FrontendSettings {
        FrontendSettings {
            auth_enabled: self.auth_enabled,
            feedback_enabled: self.feedback_enabled,
            sanitize_answer: self.sanitize_answer,
            ui: UiSettings {
                title: self.ui.title.clone(),
                chat_title: self.ui.chat_title.clone(),
                chat_description: self.ui.chat_description.clone(),
                show_share_button: self.ui.show_share_button,
            },
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(!config.auth_enabled);
        assert!(config.feedback_enabled);
        assert!(config.sanitize_answer);
        assert_eq!(config.ui.title, "Contoso");
    }

    #[test]
    fn flags_accept_common_spellings_and_ignore_garbage() {
        let vars: HashMap<&str, &str> = [
            ("AUTH_ENABLED", "Yes"),
            ("FEEDBACK_ENABLED", "0"),
            ("SANITIZE_ANSWER", "maybe"),
            ("UI_TITLE", "Support"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert!(config.auth_enabled);
        assert!(!config.feedback_enabled);
        assert!(config.sanitize_answer);

        let settings = config.frontend_settings();
        assert_eq!(settings.ui.title, "Support");
        assert!(!settings.feedback_enabled);
    }
}
