//! Identifier rules: canonical qualified names, quoting, and pluralization.
//!
//! Both sides of a diff (catalog objects and currently-held grants) pass
//! through `canonical_name`, so the two compare like-for-like.

use crate::types::ObjectType;

/// English plural of a type name: `policy` → `policies`, `schema` → `schemas`.
/// The last word is pluralized, preserving case.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let upper = word.chars().any(|c| c.is_ascii_uppercase());
    let consonant_y =
        lower.ends_with('y') && !["ay", "ey", "oy", "uy"].iter().any(|end| lower.ends_with(end));
    let (stem, suffix) = if consonant_y {
        (&word[..word.len() - 1], "ies")
    } else if ["s", "x", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        (word, "es")
    } else {
        (word, "s")
    };
    if upper {
        format!("{stem}{}", suffix.to_uppercase())
    } else {
        format!("{stem}{suffix}")
    }
}

/// Whether `s` is an identifier that needs no quoting (upper-case form).
pub fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '$')
}

/// Double-quote an identifier for query text, doubling embedded quotes.
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Single-quote a string literal for query text, doubling embedded quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Canonical form of a principal (role/user) name: unquoted names fold to
/// upper case, quoted names keep their case.
pub fn canonical_principal(name: &str) -> String {
    canonical_part(name.trim())
}

/// Canonical part for a name as the remote system stores it (unquoted,
/// case preserved), e.g. the `database_name` column of an inventory row.
pub fn stored_identifier(stored: &str) -> String {
    if is_plain_identifier(stored) {
        stored.to_string()
    } else {
        quote_ident(stored)
    }
}

/// Split a qualified name on `.` outside double quotes and parentheses.
pub fn split_qualified(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push_str("\"\"");
                chars.next();
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '.' if !in_quotes && depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Canonical qualified name for an object of `object_type`.
///
/// Callable signatures lose their return-type decoration and argument names;
/// future-grant placeholders (`DB.SCH.<TABLE>`) lose the placeholder segment.
pub fn canonical_name(raw: &str, object_type: ObjectType) -> String {
    let raw = if object_type.is_callable() {
        raw.replacen(" RETURN ", ":", 1)
    } else {
        raw.to_string()
    };
    let mut parts = split_qualified(raw.trim());
    if parts.len() > 1 && parts.last().is_some_and(|p| p.starts_with('<') && p.ends_with('>')) {
        parts.pop();
    }
    let last = parts.len().saturating_sub(1);
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if object_type.is_callable() && i == last && part.contains('(') {
                canonical_signature(&unquote(part))
            } else {
                canonical_part(part)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Name of the database a canonical name lives in.
pub fn first_part(name: &str) -> String {
    split_qualified(name).into_iter().next().unwrap_or_default()
}

fn canonical_part(part: &str) -> String {
    let part = part.trim();
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        let inner = unquote(part);
        if is_plain_identifier(&inner) {
            inner
        } else {
            quote_ident(&inner)
        }
    } else {
        part.to_uppercase()
    }
}

fn unquote(part: &str) -> String {
    let part = part.trim();
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        part[1..part.len() - 1].replace("\"\"", "\"")
    } else {
        part.to_string()
    }
}

/// `NAME(ARG TYPE, ...):RET` → `NAME(TYPE, ...)`.
fn canonical_signature(signature: &str) -> String {
    let without_return = match top_level_find(signature, ':') {
        Some(idx) => &signature[..idx],
        None => signature,
    };
    let Some(open) = without_return.find('(') else {
        return without_return.trim().to_uppercase();
    };
    let name = without_return[..open].trim().to_uppercase();
    let close = without_return.rfind(')').unwrap_or(without_return.len());
    let args_text = if close > open { &without_return[open + 1..close] } else { "" };
    let args: Vec<String> = split_top_level(args_text, ',')
        .into_iter()
        .map(argument_type)
        .filter(|arg| !arg.is_empty())
        .collect();
    format!("{name}({})", args.join(", "))
}

/// Type of one signature argument: the last top-level word, whitespace removed.
fn argument_type(arg: &str) -> String {
    split_top_level(arg.trim(), ' ')
        .into_iter()
        .filter(|word| !word.trim().is_empty())
        .last()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<String>()
        .to_uppercase()
}

fn top_level_find(s: &str, needle: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}
