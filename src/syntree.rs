use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

/// A parse tree. Branches are labelled constituents with at least one child,
/// leaves are the input words.
#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The constituent label, or None for a leaf
  pub fn label(&self) -> Option<&T> {
    self.get_branch().map(|(c, _)| &c.value)
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// The yield: leaf values, left to right
  pub fn leaves(&self) -> Vec<&U> {
    self
      .subtrees()
      .filter_map(|t| t.get_leaf().map(|w| &w.value))
      .collect()
  }

  /// Pre-order, left-to-right walk over every node, starting with `self`
  pub fn subtrees(&self) -> Subtrees<'_, T, U> {
    Subtrees { stack: vec![self] }
  }

  pub fn map<V, W>(
    &self,
    map_branch: fn(&Constituent<T>) -> V,
    map_leaf: fn(&Word<U>) -> W,
  ) -> SynTree<V, W> {
    match self {
      Self::Branch(t, children) => {
        let children = children
          .iter()
          .map(|c| c.map(map_branch, map_leaf))
          .collect::<Vec<_>>();
        SynTree::Branch(
          Constituent {
            span: t.span,
            value: map_branch(t),
          },
          children,
        )
      }
      Self::Leaf(u) => SynTree::Leaf(Word {
        span: u.span,
        value: map_leaf(u),
      }),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  /// Single-line labelled bracketing, like `(S (NP (N holmes)) (VP (V sat)))`
  pub fn bracketed(&self) -> String {
    match self {
      Self::Leaf(w) => w.value.to_string(),
      Self::Branch(c, children) => {
        let mut s = format!("({}", c.value);
        for child in children {
          s.push(' ');
          s.push_str(&child.bracketed());
        }
        s.push(')');
        s
      }
    }
  }
}

pub struct Subtrees<'a, T, U> {
  stack: Vec<&'a SynTree<T, U>>,
}

impl<'a, T, U> Iterator for Subtrees<'a, T, U> {
  type Item = &'a SynTree<T, U>;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.stack.pop()?;
    if let SynTree::Branch(_, children) = node {
      self.stack.extend(children.iter().rev());
    }
    Some(node)
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(t) => write!(f, "{}", t),
      Self::Branch(t, ts) => {
        write!(f, "({}", t)?;
        if ts.len() == 1 {
          write!(f, " ({}))", ts[0])
        } else {
          for t in ts.iter() {
            // TODO: is there a nice way to do this that doesn't allocate a String?
            let fmt = format!("{}", t);
            for line in fmt.lines() {
              write!(f, "\n  {}", line)?;
            }
          }
          write!(f, ")")
        }
      }
    }
  }
}
