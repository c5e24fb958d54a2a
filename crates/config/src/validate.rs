//! Configuration validation.
//!
//! Detects syntax errors, unknown or misspelled fields, type errors and
//! semantic problems (empty prefixes, bad webhook URLs, ...).

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use {serde_json::Value, staffchat_common::Channel};

use crate::{
    loader::{parse_config, parse_config_value},
    schema::StaffChatConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// "syntax", "unknown-field", "type-error", "prefix", "persistence" or "relay"
    pub category: &'static str,
    /// Dotted path, e.g. "staff.prefixed_chat.identifier"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    /// Dynamic keys (user placeholders).
    Map,
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Map, Struct};

    let channel = || {
        Struct(HashMap::from([
            ("leaving_enabled", Leaf),
            (
                "prefixed_chat",
                Struct(HashMap::from([("enabled", Leaf), ("identifier", Leaf)])),
            ),
            (
                "sound",
                Struct(HashMap::from([
                    ("enabled", Leaf),
                    ("name", Leaf),
                    ("volume", Leaf),
                    ("pitch", Leaf),
                ])),
            ),
            (
                "relay",
                Struct(HashMap::from([("channel_id", Leaf), ("webhook_url", Leaf)])),
            ),
        ]))
    };

    let channel_messages = || {
        Struct(HashMap::from([
            (
                "formats",
                Struct(HashMap::from([
                    ("player", Leaf),
                    ("relay", Leaf),
                    ("console", Leaf),
                ])),
            ),
            (
                "relay_formats",
                Struct(HashMap::from([("player", Leaf), ("console", Leaf)])),
            ),
            (
                "notifications",
                Struct(HashMap::from([
                    ("auto_enabled", Leaf),
                    ("auto_disabled", Leaf),
                    ("auto_enabled_others", Leaf),
                    ("auto_disabled_others", Leaf),
                    ("leave_self", Leaf),
                    ("leave_others", Leaf),
                    ("leave_reminder", Leaf),
                    ("leave_disabled", Leaf),
                    ("join_self", Leaf),
                    ("join_others", Leaf),
                    ("sounds_muted", Leaf),
                    ("sounds_unmuted", Leaf),
                ])),
            ),
        ]))
    };

    Struct(HashMap::from([
        ("persist_toggles", Leaf),
        (
            "data",
            Struct(HashMap::from([
                ("directory", Leaf),
                ("save_interval_secs", Leaf),
            ])),
        ),
        ("staff", channel()),
        ("team", channel()),
        (
            "relay",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("timeout_secs", Leaf),
                ("username", Leaf),
            ])),
        ),
        (
            "messages",
            Struct(HashMap::from([
                ("placeholders", Map),
                ("staff", channel_messages()),
                ("team", channel_messages()),
            ])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate the config at `path`, or the discovered config file when `None`.
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "syntax",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let diagnostics = match std::fs::read_to_string(&actual_path) {
        Ok(raw) => validate_str(&crate::env_subst::substitute_env(&raw), &actual_path),
        Err(e) => vec![Diagnostic::new(
            Severity::Error,
            "syntax",
            "",
            format!("failed to read config file: {e}"),
        )],
    };

    ValidationResult {
        diagnostics,
        config_path: Some(actual_path),
    }
}

/// Validate raw config text. The format is taken from the extension of `path`.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> Vec<Diagnostic> {
    let value = match parse_config_value(raw, path) {
        Ok(v) => v,
        Err(e) => {
            return vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            )];
        },
    };

    let mut diagnostics = Vec::new();
    check_unknown_fields(&value, &build_schema_map(), "", &mut diagnostics);

    match parse_config(raw, path) {
        Ok(config) => diagnostics.extend(check_config(&config)),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    diagnostics
}

fn check_unknown_fields(
    value: &Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (Value::Object(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };

    let known: Vec<&str> = fields.keys().copied().collect();
    for (key, child) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match fields.get(key.as_str()) {
            Some(child_schema) => check_unknown_fields(child, child_schema, &path, diagnostics),
            None => {
                let message = match suggest(key, &known, 3) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_string(),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    path,
                    message,
                ));
            },
        }
    }
}

/// Semantic checks on a parsed config.
#[must_use]
pub fn check_config(config: &StaffChatConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for channel in Channel::ALL {
        let cfg = config.channel(channel);
        let prefixed = &cfg.prefixed_chat;
        if prefixed.enabled && prefixed.identifier.trim().is_empty() {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "prefix",
                format!("{channel}.prefixed_chat.identifier"),
                "prefixed chat is enabled but the identifier is empty",
            ));
        }

        if let Some(url) = &cfg.relay.webhook_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "relay",
                format!("{channel}.relay.webhook_url"),
                format!("webhook URL must use http or https, got \"{url}\""),
            ));
        }
    }

    let (staff, team) = (&config.staff.prefixed_chat, &config.team.prefixed_chat);
    if staff.enabled && team.enabled && staff.identifier == team.identifier {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "prefix",
            "team.prefixed_chat.identifier",
            format!(
                "staff and team share the identifier \"{}\"; staff chat takes it first",
                staff.identifier
            ),
        ));
    }

    if config.data.save_interval_secs == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "persistence",
            "data.save_interval_secs",
            "save interval must be at least one second",
        ));
    }

    let has_webhook = Channel::ALL
        .iter()
        .any(|c| config.channel(*c).relay.webhook_url.is_some());
    if config.relay.enabled && !has_webhook {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "relay",
            "relay.enabled",
            "relay is enabled but no channel has a webhook_url; nothing will be forwarded",
        ));
    }

    diagnostics
}

// ── Tests ───────────────────────────────────────────────────────────────────
