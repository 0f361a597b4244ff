use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Convert `camelCase`, `PascalCase`, `kebab-case` or anything in between to
/// `snake_case`.
///
/// Acronyms stay together: `HTTPServer` → `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_lower);
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Module (and file stem) for a tool. Keywords and leading digits get a
/// `tool_` prefix so the module can be declared without raw identifiers.
pub fn module_name(tool_name: &str) -> String {
    let snake = to_snake_case(tool_name);
    if snake.is_empty() {
        return "tool".to_string();
    }
    let starts_with_digit = snake.chars().next().is_some_and(|c| c.is_ascii_digit());
    if KEYWORDS.contains(&snake.as_str()) || starts_with_digit {
        format!("tool_{snake}")
    } else {
        snake
    }
}

/// Deduplicate module names in tool order by appending `_1`, `_2`, ...
pub fn unique_module_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if !seen.contains(&candidate) {
            println!("⚠️  Duplicate module name '{name}' → using '{candidate}'");
            seen.insert(candidate.clone());
            return candidate;
        }
        counter += 1;
    }
}

/// Raw string literal for `text`, with enough `#`s that nothing inside can
/// terminate it.
///
/// Raw strings cannot hold a bare carriage return, so text containing one
/// falls back to an escaped [`string_literal`].
pub fn raw_string_literal(text: &str) -> String {
    if text.contains('\r') {
        return string_literal(text);
    }
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in text.chars() {
        match (c, run) {
            ('"', _) => run = Some(0),
            ('#', Some(n)) => {
                run = Some(n + 1);
                longest = longest.max(n + 1);
            }
            _ => run = None,
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

/// Ordinary string literal (escaped) for `text`.
pub fn string_literal(text: &str) -> String {
    format!("{text:?}")
}

/// Lines of `text` for `//!` and `///` comments.
///
/// `\r\n` and lone `\r` both end a line; comments cannot contain a bare
/// carriage return.
pub fn doc_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// `text` squeezed onto a single comment line.
pub fn doc_inline(text: &str) -> String {
    doc_lines(text).join(" ").trim().to_string()
}
