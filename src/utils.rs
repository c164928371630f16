use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

pub(crate) use regex_static;

/// Takes a list where each element is a set of choices, and returns all the possible sets
/// generated, varying the first position fastest. Will clone the elements.
///
/// ```
/// let v = vec![
///   vec![1],
///   vec![2, 3],
///   vec![4, 5],
/// ];
///
/// assert_eq!(npchunker::utils::combinations(&v), vec![
///   vec![1, 2, 4],
///   vec![1, 3, 4],
///   vec![1, 2, 5],
///   vec![1, 3, 5],
/// ]);
/// ```
pub fn combinations<T>(list: &[Vec<T>]) -> Vec<Vec<T>>
where
  T: Clone,
{
  if list.is_empty() {
    Vec::new()
  } else if list.len() == 1 {
    list[0].iter().map(|e| vec![e.clone()]).collect()
  } else {
    let (head, tail) = list.split_at(1);
    let head = &head[0];

    combinations(tail)
      .into_iter()
      .flat_map(|subseq| {
        // prepend every element of the head to every possible subseq
        head.iter().map(move |v| {
          let mut newseq = Vec::with_capacity(subseq.len() + 1);
          newseq.push(v.clone());
          newseq.extend(subseq.iter().cloned());
          newseq
        })
      })
      .collect()
  }
}

#[test]
fn test_combinations_with_empty_choice() {
  // a position with no choices means no combination can be built
  let v: Vec<Vec<u8>> = vec![vec![1, 2], vec![]];
  assert!(combinations(&v).is_empty());
}
