#[macro_use]
extern crate lazy_static;

pub mod utils;

pub mod chunk;
pub mod earley;
pub mod forest;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod syntree;
pub mod tokenize;

use tracing::debug;

pub use crate::chunk::{Chunk, np_chunks};
pub use crate::grammar::Grammar;
pub use crate::syntree::SynTree;
pub use crate::utils::Err;

/// One parse tree of a sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
  pub tree: SynTree<String, String>,
}

impl Parse {
  /// Minimal noun phrases of this tree, in left-to-right order
  pub fn chunks(&self) -> Vec<Chunk<'_>> {
    np_chunks(&self.tree)
  }
}

/// Outcome of analysing one sentence
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
  /// Nothing left to parse once punctuation and numbers were dropped
  EmptyInput,
  /// No derivation exists. `unknown_words` lists tokens outside the grammar's
  /// vocabulary; it is empty when every word is known but the sentence is ungrammatical.
  NoParse { unknown_words: Vec<String> },
  /// Every distinct parse, in a fixed enumeration order
  Parsed(Vec<Parse>),
}

impl Analysis {
  pub fn trees(&self) -> &[Parse] {
    match self {
      Self::Parsed(parses) => parses,
      _ => &[],
    }
  }
}

/// Tokenizes and parses a sentence against `g`
pub fn analyze(g: &Grammar, sentence: &str) -> Analysis {
  let tokens = tokenize::tokenize(sentence);
  if tokens.is_empty() {
    debug!("no tokens in input");
    return Analysis::EmptyInput;
  }

  let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
  debug!(?tokens, "tokenized sentence");

  let trees = g.parse(&tokens);
  if trees.is_empty() {
    return Analysis::NoParse {
      unknown_words: g.unknown_words(&tokens),
    };
  }

  Analysis::Parsed(trees.into_iter().map(|tree| Parse { tree }).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rules::Rule;
  use std::rc::Rc;

  fn builtin() -> Grammar {
    Grammar::builtin().unwrap()
  }

  #[test]
  fn test_holmes_sat() {
    let analysis = analyze(&builtin(), "Holmes sat.");
    let parses = analysis.trees();
    assert_eq!(parses.len(), 1);
    assert_eq!(
      parses[0].tree.bracketed(),
      "(S (NP (N holmes)) (VP (V sat)))"
    );
    let chunks = parses[0].chunks();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].words(), vec!["holmes"]);
  }

  #[test]
  fn test_unknown_word_is_no_parse() {
    assert_eq!(
      analyze(&builtin(), "Holmes xyzzy."),
      Analysis::NoParse {
        unknown_words: vec!["xyzzy".to_string()]
      }
    );
  }

  #[test]
  fn test_ungrammatical_with_known_words() {
    assert_eq!(
      analyze(&builtin(), "sat holmes the"),
      Analysis::NoParse {
        unknown_words: Vec::new()
      }
    );
  }

  #[test]
  fn test_empty_input() {
    let g = builtin();
    assert_eq!(analyze(&g, ""), Analysis::EmptyInput);
    assert_eq!(analyze(&g, " ... 42 !"), Analysis::EmptyInput);
    assert!(analyze(&g, "").trees().is_empty());
  }

  #[test]
  fn test_ambiguous_bracketings() {
    // PP -> P NP with NP -> Det NP or NP -> Det N, versus PP -> P Det NP
    let analysis = analyze(&builtin(), "Holmes sat in the armchair.");
    let parses = analysis.trees();
    assert_eq!(parses.len(), 3);
    assert_ne!(parses[0].tree, parses[1].tree);
    assert_ne!(parses[1].tree, parses[2].tree);
    for parse in parses {
      assert_eq!(parse.tree.leaves(), vec!["holmes", "sat", "in", "the", "armchair"]);
    }
    // declaration order: PP -> P NP comes first
    assert_eq!(
      parses[0].tree.bracketed(),
      "(S (NP (N holmes)) (VP (V sat) (PP (P in) (NP (Det the) (NP (N armchair))))))"
    );
    assert_eq!(
      parses[1].tree.bracketed(),
      "(S (NP (N holmes)) (VP (V sat) (PP (P in) (NP (Det the) (N armchair)))))"
    );
    assert_eq!(
      parses[2].tree.bracketed(),
      "(S (NP (N holmes)) (VP (V sat) (PP (P in) (Det the) (NP (N armchair)))))"
    );
  }

  #[test]
  fn test_parsing_is_deterministic() {
    let g = builtin();
    let sentence = "Holmes chuckled in the little red armchair.";
    let first = analyze(&g, sentence);
    assert_eq!(first.trees().len(), 4);
    assert_eq!(first, analyze(&g, sentence));
  }

  #[test]
  fn test_trees_use_only_grammar_rules() {
    let g = builtin();
    let input = ["she", "smiled", "at", "the", "moist", "little", "armchair"];
    let trees = g.derivations(&input);
    assert!(!trees.is_empty());

    for tree in trees.iter() {
      assert_eq!(tree.leaves(), input.to_vec());
      for node in tree.subtrees() {
        if let Some((cons, children)) = node.get_branch() {
          let rule: &Rc<Rule> = &cons.value;
          assert!(
            g.rules_for(rule.symbol_str()).iter().any(|r| Rc::ptr_eq(r, rule)),
            "{} is not a grammar rule",
            rule
          );
          assert_eq!(rule.len(), children.len());
        }
      }
    }
  }
}
