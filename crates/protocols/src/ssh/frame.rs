// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt-driven framing of interactive shell output.

/// Prompt terminators used when the host config carries none.
pub fn default_prompts() -> Vec<String> {
    vec!["#".to_string()]
}

/// True when the accumulated output contains at least one occurrence of
/// any configured prompt.
pub fn prompt_found(buffer: &str, prompts: &[String]) -> bool {
    prompts.iter().any(|p| !p.is_empty() && buffer.contains(p.as_str()))
}

/// Clean a raw response: skip past the echoed command, trim newline/space/CR
/// padding, and truncate at the first configured prompt.
pub fn clean_response(raw: &str, command: &str, prompts: &[String]) -> String {
    let body = match raw.find(command) {
        Some(idx) => {
            let start = idx + command.len() + 1;
            raw.get(start..).unwrap_or("")
        }
        None => raw,
    };
    let mut cleaned = body.trim_matches(trim_char).to_string();
    let cut = prompts
        .iter()
        .filter(|p| !p.is_empty())
        .filter_map(|p| cleaned.find(p.as_str()))
        .min();
    if let Some(cut) = cut {
        cleaned.truncate(cut);
    }
    cleaned.trim_end_matches(trim_char).to_string()
}

fn trim_char(c: char) -> bool {
    c == '\n' || c == ' ' || c == '\r'
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
