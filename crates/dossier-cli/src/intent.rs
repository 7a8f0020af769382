//! Free-text intent parsing for the REPL.
//!
//! The REPL accepts plain conversation, not just slash commands: "find
//! jane doe", "investigate Jane Doe", a bare "Jane Doe", or "make report"
//! all do the obvious thing. Rules, in priority order: report triggers,
//! then a bare name, then investigation verbs with a name extracted from
//! the rest, then greetings.

/// What a free-text line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Run an investigation for the named target
    Investigate(String),

    /// Show the report for the last investigation
    Report,

    /// Greeting/small talk - answer with usage hints
    SmallTalk,

    /// Nothing recognizable
    Unknown,
}

const REPORT_TRIGGERS: [&str; 5] = [
    "make report",
    "generate report",
    "show report",
    "give me the report",
    "what did you find",
];

const INVESTIGATION_PREFIXES: [&str; 9] = [
    "find info on",
    "report on",
    "look up",
    "search for",
    "investigate",
    "research",
    "analyze",
    "find",
    "who is",
];

const GREETINGS: [&str; 4] = ["hello", "hi", "hey", "greetings"];

/// Parse one free-text line.
pub fn parse(line: &str) -> Intent {
    let trimmed = line.trim();
    let lowered = trimmed.to_lowercase();

    if REPORT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        return Intent::Report;
    }

    if GREETINGS.iter().any(|g| lowered.starts_with(g)) {
        return Intent::SmallTalk;
    }

    // a bare "First Last" is an investigation request on its own; longer
    // free text needs an explicit verb
    if trimmed.split_whitespace().count() == 2 {
        if let Some(name) = plausible_name(trimmed) {
            return Intent::Investigate(name);
        }
    }

    for prefix in INVESTIGATION_PREFIXES {
        if let Some(rest) = lowered.strip_prefix(prefix) {
            if let Some(name) = plausible_name(rest) {
                return Intent::Investigate(name);
            }
        }
    }

    Intent::Unknown
}

/// At least two purely-alphabetic words make a name; returned title-cased.
fn plausible_name(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 || !words.iter().all(|w| w.chars().all(|c| c.is_alphabetic())) {
        return None;
    }

    let name = words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_investigates() {
        assert_eq!(
            parse("jane doe"),
            Intent::Investigate("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_verb_prefixes_investigate() {
        assert_eq!(
            parse("investigate jane doe"),
            Intent::Investigate("Jane Doe".to_string())
        );
        assert_eq!(
            parse("find info on jane doe"),
            Intent::Investigate("Jane Doe".to_string())
        );
        assert_eq!(
            parse("Look up Jane Doe"),
            Intent::Investigate("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_report_triggers() {
        assert_eq!(parse("make report"), Intent::Report);
        assert_eq!(parse("so, what did you find?"), Intent::Report);
    }

    #[test]
    fn test_greetings() {
        assert_eq!(parse("hello there"), Intent::SmallTalk);
        assert_eq!(parse("hi"), Intent::SmallTalk);
    }

    #[test]
    fn test_single_word_is_not_a_name() {
        assert_eq!(parse("investigate"), Intent::Unknown);
        assert_eq!(parse("jane"), Intent::Unknown);
    }

    #[test]
    fn test_three_word_name_needs_a_verb() {
        assert_eq!(parse("jane van doe"), Intent::Unknown);
        assert_eq!(
            parse("investigate jane van doe"),
            Intent::Investigate("Jane Van Doe".to_string())
        );
    }

    #[test]
    fn test_numbers_are_not_a_name() {
        assert_eq!(parse("investigate agent 47"), Intent::Unknown);
    }
}
