//! Identifier tokenization between naming conventions.
//!
//! `decode` splits any supported identifier style (snake, kebab, camel,
//! Pascal, screaming snake, and mixtures) into lowercase words; `encode`
//! joins words back under a chosen [`Convention`]. Used by the flatten and
//! tag-recase manglers to build flat field names and source-facing tags.

use thiserror::Error;

/// A naming convention for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// `pool_size`
    Snake,
    /// `POOL_SIZE`
    ScreamingSnake,
    /// `pool-size`
    Kebab,
    /// `poolSize`
    Camel,
    /// `PoolSize`
    Pascal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("empty identifier")]
    Empty,

    #[error("identifier '{0}' starts with a digit")]
    LeadingDigit(String),

    #[error("identifier '{ident}' contains unsupported character '{ch}'")]
    UnsupportedChar { ident: String, ch: char },
}

/// Split an identifier into lowercase words.
///
/// Accepts ASCII letters, digits, `_`, and `-`. Word boundaries are
/// separators and case transitions; acronym runs keep their last capital
/// with the following word (`HTTPServer` → `http`, `server`). Digits stick
/// to the preceding letters (`utf8Parser` → `utf8`, `parser`).
pub fn decode(ident: &str) -> Result<Vec<String>, CaseError> {
    let Some(first) = ident.chars().next() else {
        return Err(CaseError::Empty);
    };
    if first.is_ascii_digit() {
        return Err(CaseError::LeadingDigit(ident.to_string()));
    }
    if let Some(ch) = ident
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(CaseError::UnsupportedChar {
            ident: ident.to_string(),
            ch,
        });
    }

    let mut words = Vec::new();
    for segment in ident.split(['_', '-']) {
        if !segment.is_empty() {
            split_case_runs(segment, &mut words);
        }
    }
    if words.is_empty() {
        return Err(CaseError::Empty);
    }
    Ok(words)
}

/// Split one separator-free segment on case transitions.
fn split_case_runs(segment: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = segment.chars().collect();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev_upper = chars[i - 1].is_ascii_uppercase();
        let cur_upper = chars[i].is_ascii_uppercase();
        let next_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());

        // lower→Upper starts a word; the last capital of an acronym run
        // starts a word when a lowercase letter follows it.
        let boundary = cur_upper && (!prev_upper || next_lower);
        if boundary {
            out.push(chars[start..i].iter().collect::<String>().to_lowercase());
            start = i;
        }
    }
    out.push(chars[start..].iter().collect::<String>().to_lowercase());
}

/// Join words into an identifier under `convention`.
///
/// Words are lowercased before joining, so `encode(decode(x)?, c)` is
/// stable regardless of the input style of `x`.
pub fn encode<S: AsRef<str>>(words: &[S], convention: Convention) -> String {
    let lower: Vec<String> = words.iter().map(|w| w.as_ref().to_lowercase()).collect();
    match convention {
        Convention::Snake => lower.join("_"),
        Convention::ScreamingSnake => lower.join("_").to_uppercase(),
        Convention::Kebab => lower.join("-"),
        Convention::Camel => {
            let mut out = String::new();
            for (i, word) in lower.iter().enumerate() {
                if i == 0 {
                    out.push_str(word);
                } else {
                    out.push_str(&capitalize(word));
                }
            }
            out
        }
        Convention::Pascal => lower.iter().map(|w| capitalize(w)).collect(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
