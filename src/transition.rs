//! Status transitions between consecutive rounds.

use crate::round::DownSet;
use serde::Serialize;

/// Targets whose status changed since the previous round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Down now, not down in the previous round.
    pub newly_down: DownSet,
    /// Down in the previous round, not down now.
    pub recovered: DownSet,
}

impl Transition {
    /// True when nothing changed.
    pub fn is_quiet(&self) -> bool {
        self.newly_down.is_empty() && self.recovered.is_empty()
    }
}

/// Compare the current down set against the previous one.
pub fn track(current: &DownSet, previous: &DownSet) -> Transition {
    Transition {
        newly_down: current.difference(previous),
        recovered: previous.difference(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> DownSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_new_and_recovered() {
        let current = set(&["a", "b"]);
        let previous = set(&["b", "c"]);

        let t = track(&current, &previous);
        assert_eq!(t.newly_down, set(&["a"]));
        assert_eq!(t.recovered, set(&["c"]));
        assert!(t.newly_down.is_disjoint(&t.recovered));
    }

    #[test]
    fn test_equal_sets_are_quiet() {
        let s = set(&["a", "b"]);
        let t = track(&s, &s);
        assert!(t.is_quiet());
    }

    #[test]
    fn test_first_round_everything_new() {
        let t = track(&set(&["a", "b"]), &DownSet::new());
        assert_eq!(t.newly_down, set(&["a", "b"]));
        assert!(t.recovered.is_empty());
    }

    #[test]
    fn test_all_recovered() {
        let t = track(&DownSet::new(), &set(&["a"]));
        assert!(t.newly_down.is_empty());
        assert_eq!(t.recovered, set(&["a"]));
    }

    #[test]
    fn test_pure() {
        let current = set(&["x", "y", "z"]);
        let previous = set(&["z", "w"]);
        assert_eq!(track(&current, &previous), track(&current, &previous));
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let a = set(&["c", "a", "b"]);
        let b = set(&["b", "c", "a"]);
        let prev = set(&["a"]);
        assert_eq!(track(&a, &prev), track(&b, &prev));
    }
}
