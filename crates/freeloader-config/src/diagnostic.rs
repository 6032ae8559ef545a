// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors as miette diagnostics.
//!
//! Figment errors are mapped onto [`ConfigError`] with the offending key
//! located in the TOML source when possible. Unknown keys and unknown enum
//! values (such as a misspelled strategy) get a Jaro-Winkler "did you mean"
//! suggestion.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate needs before it is offered as a correction.
const MIN_SIMILARITY: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(freeloader::config::unknown_key),
        help("{}", suggestion_help(suggestion.as_deref(), expected))
    )]
    UnknownKey {
        key: String,
        /// Dotted section path, or `top level`.
        section: String,
        suggestion: Option<String>,
        expected: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A string value outside a closed set, e.g. `strategy = "cheapest"`.
    #[error("unknown value `{value}` for `{key}`")]
    #[diagnostic(
        code(freeloader::config::unknown_value),
        help("{}", suggestion_help(suggestion.as_deref(), expected))
    )]
    UnknownValue {
        key: String,
        value: String,
        suggestion: Option<String>,
        expected: String,
        #[label("not one of the accepted values")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("wrong type for `{key}`: found {found}")]
    #[diagnostic(code(freeloader::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing key `{key}`")]
    #[diagnostic(
        code(freeloader::config::missing_key),
        help("set `{key}` in freeloader.toml")
    )]
    MissingKey { key: String },

    /// Post-deserialization check failure (limits, weights, URLs).
    #[error("{message}")]
    #[diagnostic(code(freeloader::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(freeloader::config::other))]
    Other(String),
}

fn suggestion_help(suggestion: Option<&str>, expected: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? expected one of: {expected}"),
        None => format!("expected one of: {expected}"),
    }
}

/// Map every error inside `err` to a diagnostic. `sources` holds
/// `(path, content)` pairs of the TOML files that were merged.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let section: Vec<String> = error.path.iter().map(|p| p.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(key, expected) => {
                    let (span, src) = locate(&error, &section, key, sources);
                    ConfigError::UnknownKey {
                        key: key.clone(),
                        section: if section.is_empty() {
                            "top level".to_string()
                        } else {
                            format!("[{}]", section.join("."))
                        },
                        suggestion: closest_match(key, expected.iter().copied()),
                        expected: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::UnknownVariant(value, expected) => {
                    // For enum values the path already ends with the key itself.
                    let (parent, key) = split_last(&section);
                    let (span, src) = locate(&error, parent, &key, sources);
                    ConfigError::UnknownValue {
                        key: section.join("."),
                        value: value.clone(),
                        suggestion: closest_match(value, expected.iter().copied()),
                        expected: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (parent, key) = split_last(&section);
                    let (span, src) = locate(&error, parent, &key, sources);
                    ConfigError::InvalidType {
                        key: section.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                Kind::MissingField(key) => ConfigError::MissingKey {
                    key: if section.is_empty() {
                        key.to_string()
                    } else {
                        format!("{}.{key}", section.join("."))
                    },
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn split_last(path: &[String]) -> (&[String], String) {
    match path.split_last() {
        Some((last, parent)) => (parent, last.clone()),
        None => (path, String::new()),
    }
}

/// Span and source of `key` under `section` in the file the error came from.
fn locate(
    error: &figment::Error,
    section: &[String],
    key: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    // Inline strings carry no file path; a lone source is the only candidate.
    let source = origin
        .and_then(|path| sources.iter().find(|(p, _)| *p == path))
        .or_else(|| (sources.len() == 1).then(|| &sources[0]));

    match source {
        Some((name, content)) if !key.is_empty() => match find_key_offset(content, section, key) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(name, content.clone())),
            ),
            None => (None, None),
        },
        _ => (None, None),
    }
}

/// Byte offset of `key = ...` inside the `[section]` table of `content`.
///
/// The search is confined to the table body: it starts after the header
/// (or at the top of the file for an empty section) and stops at the next
/// table header.
pub fn find_key_offset(content: &str, section: &[String], key: &str) -> Option<usize> {
    let start = if section.is_empty() {
        0
    } else {
        let header = format!("[{}]", section.join("."));
        content.find(&header)? + header.len()
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            break;
        }
        if let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// The option most similar to `input`, if any clears [`MIN_SIMILARITY`].
pub fn closest_match<'a>(input: &str, options: impl IntoIterator<Item = &'a str>) -> Option<String> {
    options
        .into_iter()
        .map(|option| (strsim::jaro_winkler(input, option), option))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, option)| option.to_string())
}

/// Print every error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    eprintln!(
        "freeloader: {} configuration error{}",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
