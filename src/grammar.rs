use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::earley::{parse_chart, Chart};
use crate::forest::{Forest, RuleTree};
use crate::rules::{Production, Rule};
use crate::syntree::SynTree;
use crate::utils::Err;

/// Grammar text of the compiled-in grammar
pub const SHERLOCK_GRAMMAR: &str = include_str!("../grammars/sherlock.cfg");

/// An immutable context-free grammar. Alternatives for each symbol are kept
/// in declaration order, and lexical rules are also indexed by word.
#[derive(Debug)]
pub struct Grammar {
  start: String,
  rules: HashMap<String, Vec<Rc<Rule>>>,
  /// left-hand symbols in order of first declaration
  symbols: Vec<String>,
  /// word -> categories with a lexical rule for it
  lexicon: HashMap<String, Vec<String>>,
  /// every literal appearing anywhere in a right-hand side
  words: HashSet<String>,
}

impl Grammar {
  /// Builds a grammar from rules in declaration order. The first rule's symbol
  /// is the start symbol. Fails if there are no rules, if a rule is empty, or if
  /// a symbol reachable from the start symbol has no rules of its own.
  pub fn new(rules: Vec<Rule>) -> Result<Self, Err> {
    let start = match rules.first() {
      Some(rule) => rule.symbol_str().to_string(),
      None => return Err("empty ruleset".into()),
    };

    let mut grammar = Self {
      start,
      rules: HashMap::new(),
      symbols: Vec::new(),
      lexicon: HashMap::new(),
      words: HashSet::new(),
    };

    for rule in rules {
      if rule.is_empty() {
        return Err(format!("rule for {} has no productions", rule.symbol).into());
      }
      grammar.add_rule(rule);
    }

    grammar.validate()?;
    debug!(
      start = %grammar.start,
      symbols = grammar.symbols.len(),
      words = grammar.words.len(),
      "loaded grammar"
    );
    Ok(grammar)
  }

  fn add_rule(&mut self, rule: Rule) {
    let name = rule.symbol_str().to_string();
    let alternatives = self.rules.entry(name.clone()).or_default();
    if alternatives.iter().any(|r| **r == rule) {
      // a repeated alternative would only produce the same trees twice
      trace!(%rule, "skipping duplicate rule");
      return;
    }

    if alternatives.is_empty() {
      self.symbols.push(name.clone());
    }
    for prod in rule.productions.iter() {
      if let Production::Terminal(word) = prod {
        self.words.insert(word.clone());
      }
    }
    if rule.is_lexical() {
      let categories = self
        .lexicon
        .entry(rule.productions[0].symbol_str().to_string())
        .or_default();
      if !categories.contains(&name) {
        categories.push(name);
      }
    }

    alternatives.push(Rc::new(rule));
  }

  /// Walks every symbol reachable from the start symbol, failing on the first
  /// one referenced without any rules
  fn validate(&self) -> Result<(), Err> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pending = vec![self.start.as_str()];
    seen.insert(&self.start);

    while let Some(symbol) = pending.pop() {
      for rule in self.rules_for(symbol) {
        for prod in rule.productions.iter() {
          if let Production::Nonterminal(s) = prod {
            if !self.rules.contains_key(&s.name) {
              return Err(format!("undefined symbol {} used in rule: {}", s, rule).into());
            }
            if seen.insert(&s.name) {
              pending.push(&s.name);
            }
          }
        }
      }
    }

    for symbol in self.symbols.iter().filter(|s| !seen.contains(s.as_str())) {
      debug!(%symbol, "symbol is unreachable from the start symbol");
    }

    Ok(())
  }

  /// The compiled-in grammar
  pub fn builtin() -> Result<Self, Err> {
    SHERLOCK_GRAMMAR.parse()
  }

  pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Err> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    src
      .parse()
      .map_err(|e| format!("{}: {}", path.display(), e).into())
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  /// Alternatives for `symbol` in declaration order; empty if it has none
  pub fn rules_for(&self, symbol: &str) -> &[Rc<Rule>] {
    self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Categories with a lexical rule producing `word`, in declaration order
  pub fn categories_for(&self, word: &str) -> &[String] {
    self
      .lexicon
      .get(&word.to_lowercase())
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn is_known_word(&self, word: &str) -> bool {
    self.words.contains(&word.to_lowercase())
  }

  /// Tokens no rule can produce, in input order, each reported once
  pub fn unknown_words(&self, tokens: &[&str]) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for token in tokens {
      if !self.is_known_word(token) && !unknown.iter().any(|u| u == token) {
        unknown.push(token.to_string());
      }
    }
    unknown
  }

  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    parse_chart(self, input)
  }

  pub fn parse_forest(&self, input: &[&str]) -> Forest {
    Forest::from(self.parse_chart(input))
  }

  /// Every distinct derivation of `input` from the start symbol, with each
  /// branch still pointing at the rule that built it
  pub fn derivations(&self, input: &[&str]) -> Vec<RuleTree> {
    self.parse_forest(input).trees(self)
  }

  /// Every distinct parse tree of `input`, labelled by category
  pub fn parse(&self, input: &[&str]) -> Vec<SynTree<String, String>> {
    self
      .derivations(input)
      .iter()
      .map(|t| t.map(|c| c.value.symbol_str().to_string(), |w| w.value.clone()))
      .collect()
  }
}

impl fmt::Display for Grammar {
  /// Writes the grammar back out in the text format it is parsed from
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for symbol in self.symbols.iter() {
      write!(f, "{} ->", symbol)?;
      for (idx, rule) in self.rules_for(symbol).iter().enumerate() {
        if idx > 0 {
          write!(f, " |")?;
        }
        for p in rule.productions.iter() {
          write!(f, " {}", p)?;
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_grammar_loads() {
    let g = Grammar::builtin().unwrap();
    assert_eq!(g.start(), "S");
    assert_eq!(g.rules_for("NP").len(), 6);
    assert_eq!(g.categories_for("holmes"), ["N".to_string()]);
    assert_eq!(g.categories_for("Holmes"), ["N".to_string()]);
    assert!(g.categories_for("xyzzy").is_empty());
    assert!(g.rules_for("Nope").is_empty());
  }

  #[test]
  fn test_lexicon_lookup_is_ordered() {
    let g: Grammar = r#"
      S -> N | V
      V -> "walk"
      N -> "walk" | "day"
    "#
    .parse()
    .unwrap();
    assert_eq!(g.categories_for("walk"), ["V".to_string(), "N".to_string()]);
  }

  #[test]
  fn test_undefined_symbol_is_rejected() {
    let err = "S -> NP VP\nNP -> \"holmes\"".parse::<Grammar>().unwrap_err();
    assert!(err.to_string().contains("undefined symbol VP"), "{}", err);

    // a misspelled category like NV is caught at load time
    let err = "S -> NP\nNP -> N | NV\nN -> \"he\"\nV -> \"sat\""
      .parse::<Grammar>()
      .unwrap_err();
    assert!(err.to_string().contains("undefined symbol NV"), "{}", err);
  }

  #[test]
  fn test_unreachable_symbols_are_not_checked() {
    let g = "S -> \"x\"\nT -> Missing".parse::<Grammar>();
    assert!(g.is_ok());
  }

  #[test]
  fn test_empty_grammars() {
    assert!("".parse::<Grammar>().is_err());
    assert!("// only a comment\n".parse::<Grammar>().is_err());
    assert!(Grammar::new(vec![Rule::new("S", Vec::new())]).is_err());
  }

  #[test]
  fn test_duplicate_rules_are_collapsed() {
    let g: Grammar = "S -> N\nN -> \"he\"\nN -> \"he\"".parse().unwrap();
    assert_eq!(g.rules_for("N").len(), 1);
    assert_eq!(g.parse(&["he"]).len(), 1);
  }

  #[test]
  fn test_unknown_words() {
    let g = Grammar::builtin().unwrap();
    assert_eq!(
      g.unknown_words(&["holmes", "xyzzy", "sat", "xyzzy", "plugh"]),
      vec!["xyzzy".to_string(), "plugh".to_string()]
    );
    assert!(g.unknown_words(&["holmes", "sat"]).is_empty());
  }

  #[test]
  fn test_mixed_case_tokens_parse() {
    let g = Grammar::builtin().unwrap();
    assert!(g.unknown_words(&["Holmes", "Sat"]).is_empty());
    let trees = g.parse(&["Holmes", "Sat"]);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].bracketed(), "(S (NP (N holmes)) (VP (V sat)))");
  }

  #[test]
  fn test_display_round_trips() {
    let g = Grammar::builtin().unwrap();
    let reparsed: Grammar = g.to_string().parse().unwrap();
    assert_eq!(reparsed.to_string(), g.to_string());
    assert_eq!(
      reparsed.parse(&["holmes", "sat"]),
      g.parse(&["holmes", "sat"])
    );
  }

  #[test]
  fn test_read_from_file() {
    let path = std::env::temp_dir().join(format!("npchunker-grammar-{}.cfg", std::process::id()));
    fs::write(&path, "S -> \"ok\"\n").unwrap();
    let g = Grammar::read_from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(g.parse(&["ok"]).len(), 1);

    let err = Grammar::read_from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with(&path.display().to_string()));
  }
}
