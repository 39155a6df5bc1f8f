//! Parser for the BNF dialect used by grammar files.
//!
//! ```text
//! # comment
//! %start <expr>
//! <expr> ::= <num> "+" <num> | <num>
//!     | "-" <num>
//! <num>  ::= "1" | "2" | epsilon
//! ```

use super::{Grammar, Symbol};
use crate::error::GrammarError;
use std::collections::HashMap;

/// Start symbol used when a grammar has no `%start` line.
const FALLBACK_START: &str = "<expr6>";

/// A right-hand-side symbol before non-terminal names are resolved.
enum RawSymbol {
    Terminal(Vec<char>),
    NonTerminal(String),
}

/// Parse BNF source into a resolved grammar.
pub(super) fn parse(source: &str) -> Result<Grammar, GrammarError> {
    let mut start: Option<String> = None;
    let mut order: Vec<String> = Vec::new();
    let mut raw_rules: HashMap<String, Vec<Vec<RawSymbol>>> = HashMap::new();
    let mut current: Option<String> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("%start") {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), None) if is_non_terminal(name) => start = Some(name.to_string()),
                _ => return Err(syntax(line_no, "expected `%start <symbol>`")),
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix('|') {
            let Some(lhs) = current.as_ref() else {
                return Err(syntax(line_no, "continuation line without a preceding rule"));
            };
            let alternatives = parse_alternatives(rest, line_no)?;
            raw_rules.entry(lhs.clone()).or_default().extend(alternatives);
            continue;
        }

        if let Some((lhs, rhs)) = line.split_once("::=") {
            let lhs = lhs.trim();
            if !is_non_terminal(lhs) {
                return Err(syntax(line_no, format!("left-hand side {lhs:?} is not a non-terminal")));
            }
            let alternatives = parse_alternatives(rhs, line_no)?;
            if !raw_rules.contains_key(lhs) {
                order.push(lhs.to_string());
            }
            raw_rules.entry(lhs.to_string()).or_default().extend(alternatives);
            current = Some(lhs.to_string());
            continue;
        }

        return Err(syntax(line_no, "expected `::=` or a leading `|`"));
    }

    let index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let start_name = match start {
        Some(name) => name,
        None if index.contains_key(FALLBACK_START) => FALLBACK_START.to_string(),
        None => return Err(GrammarError::MissingStart),
    };
    let start_idx = *index
        .get(start_name.as_str())
        .ok_or_else(|| GrammarError::Undefined(start_name.clone()))?;

    let mut rules = Vec::with_capacity(order.len());
    for name in &order {
        let alternatives = raw_rules.remove(name).unwrap_or_default();
        let mut resolved = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let symbols = alternative
                .into_iter()
                .map(|symbol| match symbol {
                    RawSymbol::Terminal(chars) => Ok(Symbol::Terminal(chars)),
                    RawSymbol::NonTerminal(target) => index
                        .get(target.as_str())
                        .map(|&i| Symbol::NonTerminal(i))
                        .ok_or(GrammarError::Undefined(target)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(symbols);
        }
        rules.push(resolved);
    }

    Grammar::from_parts(order, rules, start_idx)
}

fn parse_alternatives(rhs: &str, line_no: usize) -> Result<Vec<Vec<RawSymbol>>, GrammarError> {
    rhs.split('|')
        .map(|alternative| parse_alternative(alternative, line_no))
        .collect()
}

fn parse_alternative(alternative: &str, line_no: usize) -> Result<Vec<RawSymbol>, GrammarError> {
    let alternative = alternative.trim();
    if alternative.is_empty() || alternative.eq_ignore_ascii_case("epsilon") {
        return Ok(Vec::new());
    }

    alternative
        .split_whitespace()
        .map(|token| {
            if let Some(literal) = token
                .strip_prefix('"')
                .and_then(|t| t.strip_suffix('"'))
            {
                if literal.is_empty() {
                    return Err(syntax(line_no, "empty terminal literal"));
                }
                Ok(RawSymbol::Terminal(literal.chars().collect()))
            } else if is_non_terminal(token) {
                Ok(RawSymbol::NonTerminal(token.to_string()))
            } else {
                Err(syntax(line_no, format!("unrecognised token {token:?}")))
            }
        })
        .collect()
}

fn is_non_terminal(token: &str) -> bool {
    token.len() > 2 && token.starts_with('<') && token.ends_with('>')
}

fn syntax(line: usize, message: impl Into<String>) -> GrammarError {
    GrammarError::Syntax {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_lines_extend_previous_rule() {
        let grammar = parse(
            "%start <s>\n<s> ::= \"a\"\n    | \"b\" | <t>\n<t> ::= epsilon\n",
        )
        .unwrap();
        assert_eq!(grammar.alternatives(grammar.start()).len(), 3);
        assert!(grammar.alternatives(1)[0].is_empty());
    }

    #[test]
    fn test_fallback_start_symbol() {
        let grammar = parse("<expr6> ::= \"1\"\n").unwrap();
        assert_eq!(grammar.name(grammar.start()), "<expr6>");
    }

    #[test]
    fn test_missing_start_is_error() {
        assert_eq!(parse("<a> ::= \"1\"\n").unwrap_err(), GrammarError::MissingStart);
    }

    #[test]
    fn test_undefined_reference_is_error() {
        let err = parse("%start <a>\n<a> ::= <b>\n").unwrap_err();
        assert_eq!(err, GrammarError::Undefined("<b>".to_string()));
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = parse("%start <a>\n<a> ::= \"1\"\nnonsense\n").unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_dangling_continuation_is_error() {
        let err = parse("| \"1\"\n").unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_bare_word_is_rejected() {
        let err = parse("%start <a>\n<a> ::= one\n").unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_multi_character_terminal() {
        let grammar = parse("%start <a>\n<a> ::= \"ab\" <a> | \"c\"\n").unwrap();
        assert_eq!(
            grammar.alternatives(0)[0][0],
            Symbol::Terminal(vec!['a', 'b'])
        );
        assert_eq!(grammar.alphabet(), &['a', 'b', 'c']);
    }
}
