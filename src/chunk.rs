//! Minimal constituent ("chunk") extraction over parse trees.
//!
//! A chunk is a node carrying the wanted label, other than the root, with no
//! descendant carrying the same label. Chunks come out in pre-order, left to right.

use std::fmt;

use crate::syntree::SynTree;

/// Label of noun phrase constituents
pub const NOUN_PHRASE: &str = "NP";

/// A minimal constituent, borrowed from the tree it was found in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk<'t> {
  tree: &'t SynTree<String, String>,
}

impl<'t> Chunk<'t> {
  pub fn tree(&self) -> &'t SynTree<String, String> {
    self.tree
  }

  /// The flattened words under this constituent
  pub fn words(&self) -> Vec<&'t str> {
    self.tree.leaves().into_iter().map(String::as_str).collect()
  }

  pub fn span(&self) -> (usize, usize) {
    self.tree.span()
  }
}

impl fmt::Display for Chunk<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.words().join(" "))
  }
}

struct Found<'t> {
  chunks: Vec<Chunk<'t>>,
  /// whether the subtree has any node with the label, itself included
  has_label: bool,
}

fn find_minimal<'t>(node: &'t SynTree<String, String>, label: &str) -> Found<'t> {
  match node {
    SynTree::Leaf(_) => Found {
      chunks: Vec::new(),
      has_label: false,
    },
    SynTree::Branch(cons, children) => {
      let mut chunks = Vec::new();
      let mut below = false;
      for child in children {
        let found = find_minimal(child, label);
        below |= found.has_label;
        chunks.extend(found.chunks);
      }

      let is_labelled = cons.value == label;
      if is_labelled && !below {
        chunks.push(Chunk { tree: node });
      }
      Found {
        chunks,
        has_label: is_labelled || below,
      }
    }
  }
}

/// Every non-root node labelled `label` that contains no other node labelled `label`.
/// Distinct positions are reported separately even when their words are identical.
pub fn minimal_constituents<'t>(tree: &'t SynTree<String, String>, label: &str) -> Vec<Chunk<'t>> {
  match tree {
    SynTree::Leaf(_) => Vec::new(),
    SynTree::Branch(_, children) => children
      .iter()
      .flat_map(|child| find_minimal(child, label).chunks)
      .collect(),
  }
}

/// Minimal noun phrases of a sentence tree
pub fn np_chunks(tree: &SynTree<String, String>) -> Vec<Chunk<'_>> {
  minimal_constituents(tree, NOUN_PHRASE)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Grammar;

  fn chunk_words(tree: &SynTree<String, String>) -> Vec<String> {
    np_chunks(tree).iter().map(|c| c.to_string()).collect()
  }

  fn parse(g: &Grammar, sentence: &str) -> Vec<SynTree<String, String>> {
    let tokens = crate::tokenize::tokenize(sentence);
    let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
    g.parse(&tokens)
  }

  #[test]
  fn test_single_noun_subject() {
    let g = Grammar::builtin().unwrap();
    let trees = parse(&g, "Holmes sat.");
    assert_eq!(trees.len(), 1);
    assert_eq!(chunk_words(&trees[0]), vec!["holmes"]);
  }

  #[test]
  fn test_nested_np_reports_innermost() {
    let g = Grammar::builtin().unwrap();
    let trees = parse(&g, "Holmes lit a pipe.");
    assert_eq!(trees.len(), 2);

    let all = trees.iter().map(chunk_words).collect::<Vec<_>>();
    // (NP (Det a) (N pipe)) is minimal; (NP (Det a) (NP (N pipe))) is not
    assert!(all.contains(&vec!["holmes".to_string(), "a pipe".to_string()]));
    assert!(all.contains(&vec!["holmes".to_string(), "pipe".to_string()]));
  }

  #[test]
  fn test_chunks_are_minimal() {
    let g = Grammar::builtin().unwrap();
    let trees = parse(&g, "Holmes sat in the little red armchair.");
    assert_eq!(trees.len(), 4);
    for tree in trees.iter() {
      let chunks = np_chunks(tree);
      assert_eq!(chunks.len(), 2);
      assert_eq!(chunks[1].to_string(), "armchair");
      for chunk in chunks.iter() {
        let nested = chunk
          .tree()
          .subtrees()
          .skip(1)
          .any(|t| t.label().map(String::as_str) == Some(NOUN_PHRASE));
        assert!(!nested, "{} contains another NP", chunk);
      }
    }
  }

  #[test]
  fn test_repeated_text_is_kept() {
    let g: Grammar = r#"
      S -> NP V NP
      NP -> N
      N -> "holmes"
      V -> "saw"
    "#
    .parse()
    .unwrap();
    let trees = g.parse(&["holmes", "saw", "holmes"]);
    assert_eq!(trees.len(), 1);
    let chunks = np_chunks(&trees[0]);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].words(), vec!["holmes"]);
    assert_eq!(chunks[1].words(), vec!["holmes"]);
    assert_eq!(chunks[0].span(), (0, 1));
    assert_eq!(chunks[1].span(), (2, 3));
  }

  #[test]
  fn test_root_and_missing_labels() {
    let g: Grammar = r#"
      NP -> N | N N
      N -> "day" | "walk"
    "#
    .parse()
    .unwrap();
    // the root NP itself is never a chunk
    let trees = g.parse(&["day", "walk"]);
    assert_eq!(trees.len(), 1);
    assert!(np_chunks(&trees[0]).is_empty());

    let g: Grammar = "S -> V\nV -> \"sat\"".parse().unwrap();
    let trees = g.parse(&["sat"]);
    assert!(np_chunks(&trees[0]).is_empty());
  }

  #[test]
  fn test_extraction_is_repeatable() {
    let g = Grammar::builtin().unwrap();
    let trees = parse(&g, "Holmes sat in the little red armchair.");
    assert!(!trees.is_empty());
    for tree in trees {
      assert_eq!(np_chunks(&tree), np_chunks(&tree));
    }
  }

  #[test]
  fn test_other_labels() {
    let g = Grammar::builtin().unwrap();
    let trees = parse(&g, "Holmes sat in the little red armchair.");
    assert!(!trees.is_empty());
    for tree in trees.iter() {
      let pps = minimal_constituents(tree, "PP");
      assert_eq!(pps.len(), 1);
      assert_eq!(pps[0].to_string(), "in the little red armchair");
    }
  }
}
