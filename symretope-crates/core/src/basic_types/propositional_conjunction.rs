use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;
use std::ops::Deref;

use itertools::Itertools;

use super::Predicate;

/// A conjunction of [`Predicate`]s (e.g. `[x >= 1] /\ [y <= 0]`); used to describe the reasons
/// for propagations and conflicts.
#[derive(Clone, Eq)]
pub struct PropositionalConjunction<Var> {
    predicates_in_conjunction: Vec<Predicate<Var>>,
}

impl<Var> Default for PropositionalConjunction<Var> {
    fn default() -> Self {
        PropositionalConjunction {
            predicates_in_conjunction: Vec::default(),
        }
    }
}

impl<Var> Deref for PropositionalConjunction<Var> {
    type Target = [Predicate<Var>];

    fn deref(&self) -> &Self::Target {
        &self.predicates_in_conjunction
    }
}

impl<Var> PropositionalConjunction<Var> {
    pub fn new(predicates_in_conjunction: Vec<Predicate<Var>>) -> Self {
        PropositionalConjunction {
            predicates_in_conjunction,
        }
    }

    pub fn push(&mut self, predicate: Predicate<Var>) {
        self.predicates_in_conjunction.push(predicate);
    }
}

impl<Var: Copy + Eq + Hash> PropositionalConjunction<Var> {
    pub fn extend_and_remove_duplicates(
        mut self,
        additional_elements: impl Iterator<Item = Predicate<Var>>,
    ) -> PropositionalConjunction<Var> {
        self.predicates_in_conjunction = self
            .predicates_in_conjunction
            .into_iter()
            .chain(additional_elements)
            .unique()
            .collect();
        self
    }
}

impl<Var> Extend<Predicate<Var>> for PropositionalConjunction<Var> {
    fn extend<T: IntoIterator<Item = Predicate<Var>>>(&mut self, iter: T) {
        self.predicates_in_conjunction.extend(iter);
    }
}

impl<Var> IntoIterator for PropositionalConjunction<Var> {
    type Item = Predicate<Var>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates_in_conjunction.into_iter()
    }
}

impl<Var> FromIterator<Predicate<Var>> for PropositionalConjunction<Var> {
    fn from_iter<T: IntoIterator<Item = Predicate<Var>>>(iter: T) -> Self {
        PropositionalConjunction {
            predicates_in_conjunction: iter.into_iter().collect(),
        }
    }
}

impl<Var> From<Vec<Predicate<Var>>> for PropositionalConjunction<Var> {
    fn from(predicates: Vec<Predicate<Var>>) -> Self {
        PropositionalConjunction::new(predicates)
    }
}

impl<Var: Display> Display for PropositionalConjunction<Var> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.predicates_in_conjunction.is_empty() {
            write!(f, "{{empty}}")
        } else {
            write!(
                f,
                "{}",
                self.predicates_in_conjunction
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<String>>()
                    .join("; ")
            )
        }
    }
}

impl<Var: Debug> Debug for PropositionalConjunction<Var> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.predicates_in_conjunction.iter())
            .finish()
    }
}

impl<Var: PartialEq> PartialEq for PropositionalConjunction<Var> {
    fn eq(&self, other: &Self) -> bool {
        if self.predicates_in_conjunction.len() != other.predicates_in_conjunction.len() {
            return false;
        }

        self.predicates_in_conjunction
            .iter()
            .all(|predicate| other.predicates_in_conjunction.contains(predicate))
    }
}

/// A macro which allows for the creation of a [`PropositionalConjunction`].
///
/// # Example
/// ```rust
/// # use symretope_core::conjunction;
/// # use symretope_core::predicate;
/// # use symretope_core::predicates::PropositionalConjunction;
/// # use symretope_core::BinaryAssignments;
/// let mut assignments = BinaryAssignments::default();
/// let x = assignments.new_binary();
/// let y = assignments.new_binary();
///
/// let conjunction = conjunction!([x >= 1] & [y <= 0]);
/// assert_eq!(
///     conjunction,
///     PropositionalConjunction::new(vec![predicate!(x >= 1), predicate!(y <= 0)])
/// );
/// ```
#[macro_export]
macro_rules! conjunction {
    (@to_conjunction $($body:tt)*) => {
        $crate::predicates::PropositionalConjunction::from($($body)*)
    };

    (@munch {$($body:tt)*} -> & [$($pred:tt)+] $($rest:tt)*) => {
        conjunction!(@munch {$crate::predicate![$($pred)+], $($body)*} -> $($rest)*)
    };

    (@munch {$($body:tt)*} -> ) => {
        conjunction!(@to_conjunction vec![$($body)*])
    };

    (@munch {$($body:tt)*} -> $($rest:tt)+) => {
        compile_error!("Incorrect usage of the macro")
    };

    ($($input:tt)+) => {
        conjunction!(@munch {} -> & $($input)*)
    };

    () => {
        conjunction!(@to_conjunction vec![])
    };
}
