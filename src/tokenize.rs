//! Sentence preprocessing: lowercase, split into word and punctuation runs,
//! and keep only tokens with at least one ASCII letter.

use crate::utils::regex_static;

/// Splits lowercased text into runs of word characters and runs of punctuation.
/// Whitespace separates tokens and is never part of one.
pub fn wordpunct_tokenize(text: &str) -> Vec<String> {
  regex_static!(WORD_PUNCT, r"\w+|[^\w\s]+");
  let lowered = text.to_lowercase();
  WORD_PUNCT
    .find_iter(&lowered)
    .map(|m| m.as_str().to_string())
    .collect()
}

fn has_ascii_letter(token: &str) -> bool {
  token.chars().any(|c| c.is_ascii_lowercase())
}

/// Turns raw input into the token sequence the parser consumes.
/// Tokens without any letter in `a..=z` (punctuation, bare numbers) are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
  wordpunct_tokenize(text)
    .into_iter()
    .filter(|t| has_ascii_letter(t))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_drops_punctuation() {
    assert_eq!(tokenize("Holmes sat."), vec!["holmes", "sat"]);
    assert_eq!(
      tokenize("  Holmes lit a pipe.\n"),
      vec!["holmes", "lit", "a", "pipe"]
    );
  }

  #[test]
  fn test_wordpunct_keeps_runs_separate() {
    assert_eq!(
      wordpunct_tokenize("Don't stop, 42!?"),
      vec!["don", "'", "t", "stop", ",", "42", "!?"]
    );
    assert_eq!(tokenize("Don't stop, 42!?"), vec!["don", "t", "stop"]);
  }

  #[test]
  fn test_mixed_tokens_and_empty_input() {
    assert_eq!(tokenize("r2d2 1984 ..."), vec!["r2d2"]);
    assert!(tokenize("").is_empty());
    assert!(tokenize(" . , 12 ").is_empty());
    // non-ascii letters alone don't count as words
    assert_eq!(tokenize("Été"), vec!["été"]);
    assert!(tokenize("ßø").is_empty());
  }
}
