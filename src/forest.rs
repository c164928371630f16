use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::earley::Chart;
use crate::grammar::Grammar;
use crate::rules::{Production, Rule};
use crate::syntree::{Constituent, SynTree, Word};
use crate::utils::combinations;

/// A tree whose branches remember which rule built them
pub type RuleTree = SynTree<Rc<Rule>, String>;

/// A completed item: `rule` derives exactly the words in `span`
#[derive(Debug, Clone, PartialEq)]
pub struct ForestState {
  rule: Rc<Rule>,
  span: (usize, usize),
}

impl ForestState {
  pub fn new(rule: &Rc<Rule>, start: usize, end: usize) -> Self {
    Self {
      rule: rule.clone(),
      span: (start, end),
    }
  }
}

impl fmt::Display for ForestState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.rule)
  }
}

impl From<&ForestState> for Constituent<Rc<Rule>> {
  fn from(state: &ForestState) -> Self {
    Constituent {
      value: state.rule.clone(),
      span: state.span,
    }
  }
}

/// Completed items indexed by their start position, plus the words they cover
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
  states: Vec<Vec<ForestState>>,
  words: Vec<String>,
}

impl Forest {
  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn find(&self, rule: &Rc<Rule>, start: usize, end: usize) -> Option<&ForestState> {
    self.states[start]
      .iter()
      .find(|s| s.span.1 == end && Rc::ptr_eq(&s.rule, rule))
  }

  /// Takes a rule and search span, and returns every way of cutting the span into
  /// consecutive child spans, one per production of the rule.
  /// So for the situation:
  /// ```text
  /// g := '''
  ///   S -> "x"
  ///   S -> S S
  /// '''
  /// forest := parse(g, "x x x")
  /// forest.splits(S -> S S, 0, start = 0, end = 3)
  /// ```
  /// you'd get `[[(0, 1), (1, 3)], [(0, 2), (2, 3)]]`.
  fn splits(
    &self,
    rule: &Rule,
    prod_idx: usize,
    search_start: usize,
    search_end: usize,
  ) -> Vec<Vec<(usize, usize)>> {
    if prod_idx == rule.len() && search_start == search_end {
      // base case, we consumed the whole rule and the whole span together.
      // provide a single empty sequence as a base for prepending onto as we unwind the stack
      return vec![Vec::new()];
    } else if prod_idx == rule.len() || search_start == search_end {
      // we either ran out of productions before consuming everything, or ran out of stuff to consume before
      // satisfying all the productions. bail with 0 possible sequences.
      return Vec::new();
    }

    let child_ends = match &rule.productions[prod_idx] {
      Production::Terminal(word) => {
        if self.words[search_start] == *word {
          vec![search_start + 1]
        } else {
          Vec::new()
        }
      }
      Production::Nonterminal(symbol) => {
        // several rules for the same symbol can end at the same place; each end is one cut
        let mut ends = Vec::new();
        for state in self.states[search_start].iter() {
          if state.span.1 <= search_end
            && state.rule.symbol == *symbol
            && !ends.contains(&state.span.1)
          {
            ends.push(state.span.1);
          }
        }
        ends
      }
    };

    child_ends
      .into_iter()
      .flat_map(|end| {
        self
          .splits(rule, prod_idx + 1, end, search_end)
          .into_iter()
          .map(move |mut seq| {
            seq.insert(0, (search_start, end));
            seq
          })
      })
      .collect()
  }

  /// Every distinct tree rooted at the grammar's start symbol that covers the whole input
  pub fn trees(&self, g: &Grammar) -> Vec<RuleTree> {
    if self.is_empty() {
      return Vec::new();
    }

    let mut builder = TreeBuilder {
      forest: self,
      grammar: g,
      memo: HashMap::new(),
      expanding: HashMap::new(),
      lowest_cut: usize::MAX,
    };
    let trees = builder.derivations(g.start(), 0, self.len());
    debug!(trees = trees.len(), spans = builder.memo.len(), "enumerated parse trees");
    trees.iter().cloned().collect()
  }
}

type SpanKey = (String, usize, usize);

/// Enumerates derivations top-down, memoising the set of trees for each (symbol, start, end)
struct TreeBuilder<'a> {
  forest: &'a Forest,
  grammar: &'a Grammar,
  memo: HashMap<SpanKey, Rc<Vec<RuleTree>>>,
  /// keys currently being expanded, with their depth in the expansion stack
  expanding: HashMap<SpanKey, usize>,
  /// shallowest expanding key re-entered since the current key started, or usize::MAX
  lowest_cut: usize,
}

impl TreeBuilder<'_> {
  fn derivations(&mut self, symbol: &str, start: usize, end: usize) -> Rc<Vec<RuleTree>> {
    let key = (symbol.to_string(), start, end);
    if let Some(trees) = self.memo.get(&key) {
      return trees.clone();
    }
    if let Some(&depth) = self.expanding.get(&key) {
      // a unary cycle led back here; any tree through it would be infinite
      self.lowest_cut = self.lowest_cut.min(depth);
      return Rc::new(Vec::new());
    }

    let depth = self.expanding.len();
    self.expanding.insert(key.clone(), depth);
    let outer_cut = std::mem::replace(&mut self.lowest_cut, usize::MAX);

    let (forest, grammar) = (self.forest, self.grammar);
    let mut trees = Vec::new();
    // alternatives in declaration order keep the enumeration reproducible
    for rule in grammar.rules_for(symbol) {
      let Some(state) = forest.find(rule, start, end) else {
        continue;
      };
      for split in forest.splits(rule, 0, start, end) {
        let child_sets = rule
          .productions
          .iter()
          .zip(split)
          .map(|(prod, (s, e))| match prod {
            Production::Terminal(word) => vec![SynTree::Leaf(Word {
              value: word.clone(),
              span: (s, e),
            })],
            Production::Nonterminal(sym) => {
              self.derivations(&sym.name, s, e).iter().cloned().collect()
            }
          })
          .collect::<Vec<_>>();

        trees.extend(
          combinations(&child_sets)
            .into_iter()
            .map(|children| SynTree::Branch(state.into(), children)),
        );
      }
    }

    let trees = Rc::new(trees);
    self.expanding.remove(&key);

    // cutting at this key or below leaves its set complete. A cut at an ancestor
    // means another route to this key may find more trees, so it isn't memoised.
    let cut = self.lowest_cut;
    if cut >= depth {
      self.memo.insert(key, trees.clone());
      self.lowest_cut = outer_cut;
    } else {
      self.lowest_cut = outer_cut.min(cut);
    }
    trees
  }
}

impl From<Chart> for Forest {
  fn from(chart: Chart) -> Self {
    let (words, chart_states) = chart.into_parts();
    // the new chart will be indexed by origin location, and no rule can have
    // its origin at the end of the string, so len is chart.len - 1
    let mut states = vec![Vec::new(); chart_states.len().saturating_sub(1)];

    for (k, items) in chart_states.into_iter().enumerate() {
      for item in items {
        // exclude unfinished rules that can't contribute to a tree
        if !item.lr0.is_active() {
          if let Some(at_origin) = states.get_mut(item.origin) {
            at_origin.push(ForestState::new(&item.lr0.rule, item.origin, k));
          }
        }
      }
    }

    Self { states, words }
  }
}

impl fmt::Display for Forest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "Origin {}:", k)?;
      for fs in self.states[k].iter() {
        writeln!(f, "  {}", fs)?;
      }
    }

    Ok(())
  }
}
