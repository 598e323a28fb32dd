// ABOUTME: REPL configuration — narrowed from the teacher's sandbox-heavy version

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "gel — an embeddable Lisp";

/// What's left once file/network builtins are out of scope: the prompt,
/// where history persists, and whether to greet the user at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub history_file: String,
    pub show_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: "gel> ".to_string(),
            history_file: ".gel_history".to_string(),
            show_banner: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_the_standard_prompt() {
        let config = Config::default();
        assert_eq!(config.prompt, "gel> ");
        assert!(config.show_banner);
    }
}
