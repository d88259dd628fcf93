use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use tracing::warn;

use crate::{schema::Author, trigger::DEFAULT_TRIGGERS};

pub const DEFAULT_TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone)]
pub struct Config {
    pub self_id: String,
    pub self_name: String,
    pub self_avatar: String,
    pub triggers: Vec<String>,
    /// Maximum number of chat messages handed to the summarizer, the new one included.
    pub context_window: usize,
    pub summary_latency: Duration,
    pub summary_timeout: Option<Duration>,
    pub time_format: String,
    pub seed_demo_thread: bool,
    pub dump_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_id: "me".into(),
            self_name: "Me".into(),
            self_avatar: "Me".into(),
            triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
            context_window: 20,
            summary_latency: Duration::from_millis(2000),
            summary_timeout: None,
            time_format: DEFAULT_TIME_FORMAT.into(),
            seed_demo_thread: true,
            dump_metrics: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let triggers = lookup("ASSISTANT_TRIGGERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .unwrap_or(defaults.triggers);

        Self {
            self_id: lookup("CHAT_SELF_ID").unwrap_or(defaults.self_id),
            self_name: lookup("CHAT_SELF_NAME").unwrap_or(defaults.self_name),
            self_avatar: lookup("CHAT_SELF_AVATAR").unwrap_or(defaults.self_avatar),
            triggers,
            context_window: parse_or(&lookup, "CONTEXT_WINDOW", defaults.context_window).max(1),
            summary_latency: Duration::from_millis(parse_or(&lookup, "SUMMARY_LATENCY_MS", 2000u64)),
            summary_timeout: lookup("SUMMARY_TIMEOUT_MS")
                .and_then(|raw| parse_value::<u64>("SUMMARY_TIMEOUT_MS", &raw))
                .map(Duration::from_millis),
            time_format: lookup("TIME_FORMAT")
                .filter(|raw| {
                    let valid = is_valid_time_format(raw);
                    if !valid {
                        warn!(key = "TIME_FORMAT", value = raw.as_str(), "Ignoring unparseable config value");
                    }
                    valid
                })
                .unwrap_or(defaults.time_format),
            seed_demo_thread: parse_or(&lookup, "SEED_DEMO_THREAD", defaults.seed_demo_thread),
            dump_metrics: parse_or(&lookup, "DUMP_METRICS", defaults.dump_metrics),
        }
    }

    pub fn author(&self) -> Author {
        Author {
            sender_id: self.self_id.clone(),
            sender_name: self.self_name.clone(),
            avatar_id: self.self_avatar.clone(),
        }
    }
}

/// True when chrono can render every specifier in `format`.
pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| parse_value(key, &raw))
        .unwrap_or(default)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = raw, "Ignoring unparseable config value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.context_window, 20);
        assert_eq!(cfg.summary_latency, Duration::from_millis(2000));
        assert!(cfg.summary_timeout.is_none());
        assert_eq!(cfg.triggers.len(), 4);
        assert_eq!(cfg.author().sender_id, "me");
        assert!(cfg.seed_demo_thread);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config_from(&[
            ("CHAT_SELF_NAME", "Wen"),
            ("ASSISTANT_TRIGGERS", "@bot, helper ,"),
            ("CONTEXT_WINDOW", "5"),
            ("SUMMARY_LATENCY_MS", "10"),
            ("SUMMARY_TIMEOUT_MS", "500"),
            ("SEED_DEMO_THREAD", "false"),
        ]);
        assert_eq!(cfg.self_name, "Wen");
        assert_eq!(cfg.triggers, vec!["@bot".to_string(), "helper".to_string()]);
        assert_eq!(cfg.context_window, 5);
        assert_eq!(cfg.summary_latency, Duration::from_millis(10));
        assert_eq!(cfg.summary_timeout, Some(Duration::from_millis(500)));
        assert!(!cfg.seed_demo_thread);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = config_from(&[
            ("CONTEXT_WINDOW", "lots"),
            ("SUMMARY_TIMEOUT_MS", "-1"),
            ("ASSISTANT_TRIGGERS", " , "),
        ]);
        assert_eq!(cfg.context_window, 20);
        assert!(cfg.summary_timeout.is_none());
        assert_eq!(cfg.triggers.len(), 4);
    }

    #[test]
    fn invalid_time_format_falls_back_to_default() {
        assert_eq!(config_from(&[("TIME_FORMAT", "%Q")]).time_format, DEFAULT_TIME_FORMAT);
        assert_eq!(config_from(&[("TIME_FORMAT", "%H:%M")]).time_format, "%H:%M");
        assert!(!is_valid_time_format("%Q"));
        assert!(is_valid_time_format(DEFAULT_TIME_FORMAT));
    }

    #[test]
    fn window_is_at_least_one() {
        assert_eq!(config_from(&[("CONTEXT_WINDOW", "0")]).context_window, 1);
    }
}
