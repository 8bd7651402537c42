// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Keys are reported by their full dotted path (`transport.wappi.tokn`).
//! When the TOML text that produced an error is available, the diagnostic
//! points at the offending key in it.

#![allow(unused_assignments)] // triggered by the miette Diagnostic derive

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

type Located = (Option<SourceSpan>, Option<NamedSource<String>>);

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(courier::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Dotted path of the rejected key.
        key: String,
        suggestion: Option<String>,
        /// Keys accepted in the same table, comma separated.
        valid_keys: String,
        #[label("not a Courier setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(courier::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value parsed but is out of range or inconsistent.
    #[error("validation error: {message}")]
    #[diagnostic(code(courier::config::validation))]
    Validation { message: String },

    /// TOML syntax errors and anything else figment reports.
    #[error("configuration error: {0}")]
    #[diagnostic(code(courier::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Keys allowed here: {valid_keys}"),
        None => format!("keys allowed here: {valid_keys}"),
    }
}

/// Converts every error carried by a figment failure.
///
/// `sources` pairs a source name with its TOML text. Errors from files are
/// matched to their source by path; with a single source, errors from
/// string providers are matched to it as well.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    let path: Vec<&str> = error.path.iter().map(String::as_str).collect();
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let table = enclosing_table(&path, field);
            let (span, src) = locate(error, table, field, sources);
            ConfigError::UnknownKey {
                key: dotted(table, field),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(found, expected) => {
            let Some(key) = path.last().copied() else {
                return ConfigError::Other(error.to_string());
            };
            let table = enclosing_table(&path, key);
            let (span, src) = locate(error, table, key, sources);
            ConfigError::InvalidType {
                key: dotted(table, key),
                found: found.to_string(),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Figment prefixes the offending key onto the error path; strip it.
fn enclosing_table<'a>(path: &'a [&'a str], key: &str) -> &'a [&'a str] {
    match path.split_last() {
        Some((last, table)) if *last == key => table,
        _ => path,
    }
}

fn dotted(table: &[&str], key: &str) -> String {
    table
        .iter()
        .copied()
        .chain(std::iter::once(key))
        .collect::<Vec<_>>()
        .join(".")
}

fn locate(
    error: &figment::Error,
    table: &[&str],
    key: &str,
    sources: &[(String, String)],
) -> Located {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let by_name = file.and_then(|name| sources.iter().find(|(n, _)| *n == name));
    let source = by_name.or(match sources {
        [only] => Some(only),
        _ => None,
    });

    let Some((name, content)) = source else {
        return (None, None);
    };
    match key_offset(content, table, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key` within `table` of a TOML document.
///
/// Follows `[a.b]` headers and keys dotted relative to the current table,
/// so `wappi.tokn = ..` under `[transport]` is found for table
/// `["transport", "wappi"]`. Top-level keys have an empty table.
pub fn key_offset(content: &str, table: &[&str], key: &str) -> Option<usize> {
    let mut current: Vec<&str> = Vec::new();
    let mut line_start = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.trim_start_matches('[').split(']').next().unwrap_or("");
            current = name.split('.').map(str::trim).collect();
        } else if !trimmed.starts_with('#') {
            if let Some((lhs, _)) = trimmed.split_once('=') {
                let lhs = lhs.trim_end();
                let mut full = current.clone();
                full.extend(lhs.split('.').map(str::trim));
                if full.split_last() == Some((&key, table)) {
                    return Some(line_start + indent + lhs.len() - key.len());
                }
            }
        }

        line_start += line.len();
    }

    None
}

/// Closest known key by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Writes each error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAPPI_KEYS: &[&str] = &["base_url", "token", "profile_id"];

    #[test]
    fn suggests_token_for_tokn() {
        assert_eq!(suggest_key("tokn", WAPPI_KEYS), Some("token".to_string()));
    }

    #[test]
    fn suggests_request_timeout_secs() {
        let transport = &[
            "simulate_unknown_providers",
            "request_timeout_secs",
            "simulated_success_rate",
            "simulated_delay_ms",
            "wappi",
        ];
        assert_eq!(
            suggest_key("request_timout_secs", transport),
            Some("request_timeout_secs".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level"]), None);
    }

    #[test]
    fn key_offset_follows_nested_header() {
        let content = "[transport]\ntokn = 1\n\n[transport.wappi]\ntokn = \"x\"\n";
        let o = key_offset(content, &["transport", "wappi"], "tokn").unwrap();
        assert_eq!(&content[o..o + 4], "tokn");
        assert!(o > content.find("[transport.wappi]").unwrap());
    }

    #[test]
    fn key_offset_resolves_dotted_keys() {
        let content = "[transport]\nrequest_timeout_secs = 5\n  wappi.tokn = \"x\"\n";
        let o = key_offset(content, &["transport", "wappi"], "tokn").unwrap();
        assert_eq!(&content[o..o + 4], "tokn");
        assert_eq!(&content[o - 6..o], "wappi.");
    }

    #[test]
    fn key_offset_ignores_same_key_in_other_tables() {
        let content = "[gateway]\nport = 1\n\n[storage]\nhots = \"x\"\n";
        assert_eq!(key_offset(content, &["gateway"], "hots"), None);
        assert!(key_offset(content, &["storage"], "hots").is_some());
    }

    #[test]
    fn key_offset_finds_top_level_keys_and_skips_comments() {
        let content = "# servce = 1\nservce = 2\n[service]\n";
        let o = key_offset(content, &[], "servce").unwrap();
        assert_eq!(o, content.find("servce = 2").unwrap());
    }

    #[test]
    fn unknown_key_help_lists_allowed_keys() {
        let help = unknown_key_help(None, "host, port");
        assert_eq!(help, "keys allowed here: host, port");
        let help = unknown_key_help(Some("port"), "host, port");
        assert!(help.starts_with("did you mean `port`?"));
    }

    #[test]
    fn enclosing_table_drops_trailing_key() {
        let path = ["transport", "wappi", "tokn"];
        assert_eq!(enclosing_table(&path, "tokn"), &["transport", "wappi"]);
        assert_eq!(enclosing_table(&path[..2], "tokn"), &["transport", "wappi"]);
    }

    #[test]
    fn dotted_joins_table_and_key() {
        assert_eq!(dotted(&["transport", "wappi"], "tokn"), "transport.wappi.tokn");
        assert_eq!(dotted(&[], "servce"), "servce");
    }
}
