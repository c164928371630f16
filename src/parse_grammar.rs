/// Simple recursive-descent parsing of grammar files
use regex::Regex;
use std::str::FromStr;

use crate::grammar::Grammar;
use crate::rules::{Production, Rule};
use crate::utils::{regex_static, Err};

impl FromStr for Grammar {
  type Err = Err;

  /// Parses and validates a grammar from a string. Assumes the first rule's symbol
  /// is the start symbol.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rules = parse(s)?;
    Self::new(rules)
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), Err>;

/// The rest of the current line, for error messages
fn excerpt(s: &str) -> &str {
  let line = s.split('\n').next().unwrap_or(s);
  line.trim_end()
}

/// Try to consume a regex anchored at the start of `s`, returning None if it doesn't match
fn optional_re<'a>(re: &Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => {
      let (matched, rest) = s.split_at(m.end());
      (Some(matched), rest)
    }
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("couldn't match {} at '{}'", re, excerpt(s)).into())
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Skips whitespace (including newlines) and comments between rules
fn skip_blank(s: &str) -> &str {
  regex_static!(BLANK, r"^(?:\s|//[^\n]*)*");
  optional_re(&BLANK, s).1
}

/// Skips whitespace and a trailing comment without leaving the current line
fn skip_inline(s: &str) -> &str {
  regex_static!(INLINE, r"^(?:[ \t\r]|//[^\n]*)*");
  optional_re(&INLINE, s).1
}

/// Tries to parse a category name made of letters, numbers, - and _
fn parse_name(s: &str) -> ParseResult<'_, &str> {
  regex_static!(NAME, r"^[a-zA-Z0-9\-_]+");
  needed_re(&NAME, s).map_err(|err| format!("name: {}", err).into())
}

/// Parses a double-quoted word, lowercasing it
fn parse_literal(s: &str) -> ParseResult<'_, String> {
  regex_static!(QUOTED, r#"^"[^"\n]*""#);
  let (quoted, s) = needed_re(&QUOTED, s).map_err(|err| -> Err { format!("literal: {}", err).into() })?;
  let word = quoted.trim_matches('"');
  if word.is_empty() {
    return Err(format!("literal: empty word at '{}'", excerpt(s)).into());
  }
  Ok((word.to_lowercase(), s))
}

fn parse_production(s: &str) -> ParseResult<'_, Production> {
  if s.starts_with('"') {
    let (word, s) = parse_literal(s)?;
    Ok((Production::Terminal(word), s))
  } else {
    let (name, s) = parse_name(s).map_err(|e| -> Err { format!("symbol: {}", e).into() })?;
    Ok((Production::nonterminal(name), s))
  }
}

/// True where an alternative stops: `|`, `;`, end of line or end of input
fn at_alternative_end(s: &str) -> bool {
  s.is_empty() || s.starts_with(['|', ';', '\n'])
}

/// One or more productions, up to the next `|` or the end of the rule
fn parse_alternative(s: &str) -> ParseResult<'_, Vec<Production>> {
  let mut productions = Vec::new();
  let mut rem = skip_inline(s);
  while !at_alternative_end(rem) {
    let (prod, s) = parse_production(rem)?;
    productions.push(prod);
    rem = skip_inline(s);
  }

  if productions.is_empty() {
    Err(format!("empty alternative at '{}'", excerpt(rem)).into())
  } else {
    Ok((productions, rem))
  }
}

/// Symbol, arrow, alternatives, terminated by newline, `;` or end of input.
/// Each alternative becomes its own Rule.
fn parse_rule(s: &str) -> ParseResult<'_, Vec<Rule>> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "^->");

  let (name, s) = parse_name(s).map_err(|e| -> Err { format!("rule symbol: {}", e).into() })?;
  let s = skip_inline(s);
  let (_, s) = needed_re(&ARROW, s).map_err(|e| -> Err { format!("rule arrow: {}", e).into() })?;

  let mut rules = Vec::new();
  let mut rem = s;
  loop {
    let (productions, s) = parse_alternative(rem)
      .map_err(|e| -> Err { format!("rule {} production: {}", name, e).into() })?;
    rules.push(Rule::new(name, productions));
    match optional_char('|', s) {
      (Some(_), s) => rem = s,
      (None, s) => {
        rem = s;
        break;
      }
    }
  }

  let (_, rem) = optional_char(';', rem);
  let rem = skip_inline(rem);
  if !rem.is_empty() && !rem.starts_with('\n') {
    return Err(format!("rule {}: unexpected trailing input '{}'", name, excerpt(rem)).into());
  }

  Ok((rules, rem))
}

/// Parses grammar text into its rules, in declaration order.
/// Errors if the text is malformed; does not validate symbol references.
pub fn parse(s: &str) -> Result<Vec<Rule>, Err> {
  let mut rules = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_blank(rem);
    if rem.is_empty() {
      return Ok(rules);
    }
    let (mut alternatives, s) = parse_rule(rem)?;
    rules.append(&mut alternatives);
    rem = s;
  }
}
