/// Tokens that address the travel assistant.
pub const DEFAULT_TRIGGERS: [&str; 4] = ["@旅遊助手", "助手", "@旅遊助理", "助理"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDetector {
    tokens: Vec<String>,
}

impl TriggerDetector {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::<String>::into)
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Case-sensitive substring match against any token.
    pub fn detect(&self, text: &str) -> bool {
        self.tokens.iter().any(|token| text.contains(token.as_str()))
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS)
    }
}
