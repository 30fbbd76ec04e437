//! Parsing of text dropped onto a terminal.
//!
//! Terminals paste dragged files as shell-quoted paths (`'/a b.jpg'`,
//! `/a\ b.jpg`) separated by spaces; file managers hand out `text/uri-list`
//! with one `file://` URI per line and `#` comment lines.

use reqwest::Url;
use std::path::PathBuf;

/// Splits a dropped payload into paths, in drop order.
pub fn parse_drop_payload(payload: &str) -> Vec<PathBuf> {
    payload
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_words)
        .filter_map(|word| to_path(&word))
        .collect()
}

fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }
    words
}

fn to_path(word: &str) -> Option<PathBuf> {
    if word.is_empty() {
        return None;
    }

    if word.starts_with("file://") {
        return match Url::parse(word).ok().and_then(|url| url.to_file_path().ok()) {
            Some(path) => Some(path),
            None => {
                tracing::warn!(uri = word, "Ignoring unusable file URI in drop");
                None
            }
        };
    }

    Some(PathBuf::from(word))
}
