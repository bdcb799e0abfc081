//! Structural tokenization (spec §3 / §4.4).
//!
//! A deterministic, allocation-only split of a DNS label into minimal
//! substrings on dash and digit-run boundaries. Concatenating a label's
//! tokens always reproduces the label (P1).

use smallvec::SmallVec;

use crate::host::Host;

/// A minimal substring of a level label. Non-first dash fragments carry
/// their leading `-` as part of the token text.
pub type Token = String;

/// One subdomain level: its original label plus its token array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLevel {
    pub label: String,
    pub tokens: SmallVec<[Token; 6]>,
}

/// A host's levels, each independently tokenized, leftmost-first (matching
/// [`Host::levels`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedHost {
    pub levels: SmallVec<[TokenizedLevel; 4]>,
}

/// Splits one label: first on `-` (non-first fragments keep a leading `-`),
/// then within each fragment on maximal digit runs. A fragment that is
/// entirely digits after the leading `-` stays a single token, e.g.
/// `api-12` -> `["api", "-12"]`, never `["api", "-", "12"]`.
pub fn tokenize_label(label: &str) -> SmallVec<[Token; 6]> {
    let mut tokens: SmallVec<[Token; 6]> = SmallVec::new();

    for (i, fragment) in label.split('-').enumerate() {
        let prefix = if i == 0 { "" } else { "-" };
        if fragment.is_empty() {
            if i > 0 {
                tokens.push("-".to_string());
            }
            continue;
        }
        split_digit_runs(fragment, prefix, &mut tokens);
    }

    tokens
}

/// Splits `fragment` on maximal digit-run boundaries, attaching `prefix` to
/// the first emitted piece only.
fn split_digit_runs(fragment: &str, prefix: &str, out: &mut SmallVec<[Token; 6]>) {
    let chars: Vec<char> = fragment.chars().collect();
    if chars.is_empty() {
        return;
    }

    let mut start = 0usize;
    let mut is_digit_run = chars[0].is_ascii_digit();
    let mut first_piece = true;

    let push = |start: usize, end: usize, out: &mut SmallVec<[Token; 6]>, first_piece: &mut bool| {
        let text: String = chars[start..end].iter().collect();
        if *first_piece {
            out.push(format!("{prefix}{text}"));
            *first_piece = false;
        } else {
            out.push(text);
        }
    };

    for idx in 1..chars.len() {
        let digit = chars[idx].is_ascii_digit();
        if digit != is_digit_run {
            push(start, idx, out, &mut first_piece);
            start = idx;
            is_digit_run = digit;
        }
    }
    push(start, chars.len(), out, &mut first_piece);
}

pub fn tokenize_host(host: &Host) -> TokenizedHost {
    let levels = host
        .levels
        .iter()
        .map(|label| TokenizedLevel {
            label: label.clone(),
            tokens: tokenize_label(label),
        })
        .collect();
    TokenizedHost { levels }
}
