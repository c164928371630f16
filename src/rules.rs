use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: String) -> Self {
    Self { name }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// One right-hand-side element: a literal word or a syntactic category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Production {
  /// Always stored lowercased
  Terminal(String),
  Nonterminal(Symbol),
}

impl Production {
  pub fn terminal(word: &str) -> Self {
    Self::Terminal(word.to_lowercase())
  }

  pub fn nonterminal(name: &str) -> Self {
    Self::Nonterminal(Symbol::new(name.to_string()))
  }

  pub fn symbol_str(&self) -> &str {
    match self {
      Self::Terminal(s) => s,
      Self::Nonterminal(s) => &s.name,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Terminal(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Self::Nonterminal(_))
  }
}

impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(s) => write!(f, "\"{}\"", s),
      Self::Nonterminal(s) => write!(f, "{}", s),
    }
  }
}

/// A single alternative, `symbol -> productions...`
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Rule {
  pub symbol: Symbol,
  pub productions: Vec<Production>,
}

impl Rule {
  pub fn new(symbol: &str, productions: Vec<Production>) -> Self {
    Self {
      symbol: Symbol::new(symbol.to_string()),
      productions,
    }
  }

  pub fn len(&self) -> usize {
    self.productions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn symbol_str(&self) -> &str {
    &self.symbol.name
  }

  /// A lexical rule rewrites its category to exactly one word, like `N -> "holmes"`
  pub fn is_lexical(&self) -> bool {
    self.productions.len() == 1 && self.productions[0].is_terminal()
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ->", self.symbol)?;
    for p in self.productions.iter() {
      write!(f, " {}", p)?;
    }
    Ok(())
  }
}

#[test]
fn test_rule_display() {
  let rule = Rule::new(
    "PP",
    vec![Production::nonterminal("P"), Production::terminal("The")],
  );
  assert_eq!(rule.to_string(), "PP -> P \"the\"");
  assert!(!rule.is_lexical());
  assert!(Rule::new("N", vec![Production::terminal("holmes")]).is_lexical());
}
