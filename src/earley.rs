use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::grammar::Grammar;
use crate::rules::{Production, Rule};

/// A dotted rule: how much of `rule` has been recognised so far
#[derive(Debug, Clone, PartialEq)]
pub struct LR0 {
  pub rule: Rc<Rule>,
  pub pos: usize,
}

impl LR0 {
  pub fn new(rule: &Rc<Rule>) -> Self {
    Self { rule: rule.clone(), pos: 0 }
  }

  pub fn is_active(&self) -> bool {
    self.pos < self.rule.len()
  }

  pub fn advance(&self) -> Self {
    assert!(self.is_active());
    Self {
      rule: self.rule.clone(),
      pos: self.pos + 1,
    }
  }

  pub fn next_production(&self) -> Option<&Production> {
    self.rule.productions.get(self.pos)
  }
}

impl fmt::Display for LR0 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.rule.symbol)?;
    for idx in 0..self.rule.len() {
      if idx == self.pos {
        write!(f, " ・")?;
      }
      write!(f, " {}", self.rule.productions[idx])?;
    }
    if !self.is_active() {
      write!(f, " ・")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
  pub lr0: LR0,
  pub origin: usize,
}

impl State {
  pub fn new(lr0: LR0, origin: usize) -> Self {
    Self { lr0, origin }
  }

  pub fn advance(&self) -> Self {
    Self::new(self.lr0.advance(), self.origin)
  }
}

/// Earley chart over a token sequence. `states[k]` holds every item ending at position k.
/// Words are lowercased on entry, matching how terminal literals are stored.
#[derive(Debug)]
pub struct Chart {
  states: Vec<Vec<State>>,
  words: Vec<String>,
}

impl Chart {
  pub fn new(input: &[&str]) -> Self {
    Self {
      states: vec![Vec::new(); input.len() + 1],
      words: input.iter().map(|w| w.to_lowercase()).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.states[k].len()
  }

  pub fn words(&self) -> &[String] {
    &self.words
  }

  pub fn has(&self, k: usize, state: &State) -> bool {
    self.states[k].contains(state)
  }

  pub fn add(&mut self, k: usize, state: State) {
    if !self.has(k, &state) {
      trace!(k, origin = state.origin, item = %state.lr0, "chart add");
      self.states[k].push(state);
    }
  }

  /// Get an owned state so that passing around &mut chart is more ergonomic
  /// The clone is fairly cheap, only an rc + 2 usize, State would be copy if not
  /// for the Rc<Rule>
  fn get_state(&self, k: usize, idx: usize) -> State {
    self.states[k][idx].clone()
  }

  /// Items whose dot has reached the end of their rule
  pub fn completed(&self) -> impl Iterator<Item = (usize, &State)> {
    self
      .states
      .iter()
      .enumerate()
      .flat_map(|(k, states)| states.iter().map(move |s| (k, s)))
      .filter(|(_, s)| !s.lr0.is_active())
  }

  /// Consumes the chart, returning the input words and the items at each position
  pub fn into_parts(self) -> (Vec<String>, Vec<Vec<State>>) {
    (self.words, self.states)
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.len() {
      writeln!(f, "State {}:", k)?;
      for state in self.states[k].iter() {
        writeln!(f, "  {}..{}: {}", state.origin, k, state.lr0)?;
      }
    }
    Ok(())
  }
}

pub fn parse_chart(g: &Grammar, input: &[&str]) -> Chart {
  let mut chart = Chart::new(input);

  for rule in g.rules_for(g.start()) {
    chart.add(0, State::new(LR0::new(rule), 0));
  }

  for k in 0..chart.len() {
    // need to use while loop because the number of states at k can expand during the loop
    let mut idx = 0;
    while idx < chart.len_at(k) {
      let state = chart.get_state(k, idx);
      idx += 1;

      match state.lr0.next_production() {
        None => completer(&mut chart, k, &state),
        Some(Production::Nonterminal(_)) => predictor(g, &mut chart, k, &state),
        Some(Production::Terminal(_)) => scanner(&mut chart, k, &state),
      };
    }
  }

  debug!(
    tokens = input.len(),
    items = (0..chart.len()).map(|k| chart.len_at(k)).sum::<usize>(),
    "built earley chart"
  );

  chart
}

fn completer(chart: &mut Chart, k: usize, state: &State) {
  assert!(!state.lr0.is_active(), "tried to complete active state");

  // lr0 has been completed, now look for states in the chart that are waiting for its symbol
  for idx in 0..chart.len_at(state.origin) {
    let other = chart.get_state(state.origin, idx);

    if let Some(np) = other.lr0.next_production() {
      if np.is_nonterminal() && np.symbol_str() == state.lr0.rule.symbol_str() {
        // found one, advance its dot and add the new state to the chart *at k*,
        // because it's now waiting on a token there
        chart.add(k, other.advance())
      }
    }
  }
}

fn predictor(g: &Grammar, chart: &mut Chart, k: usize, state: &State) {
  assert!(state.lr0.is_active(), "tried to predict non-active state");

  // this lr0 is waiting for the next production
  // let's hypothesize that one of the rules that can build this production will
  // succeed at its current position. An undefined symbol has no rules and simply
  // never completes.
  if let Some(needed) = state.lr0.next_production() {
    for wanted_rule in g.rules_for(needed.symbol_str()) {
      chart.add(k, State::new(LR0::new(wanted_rule), k));
    }
  }
}

fn scanner(chart: &mut Chart, k: usize, state: &State) {
  assert!(state.lr0.is_active(), "tried to scan non-active state");

  if let Some(Production::Terminal(word)) = state.lr0.next_production() {
    if chart.words.get(k) == Some(word) {
      // advance the state to consume this token, and add to state k + 1, where
      // it will look for the next token
      chart.add(k + 1, state.advance());
    }
  }
}
