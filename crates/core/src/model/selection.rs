use std::collections::BTreeSet;

use crate::model::ids::AnswerId;

/// The set of answer ids currently recorded for one question.
///
/// Selection semantics follow the question's input kind:
/// - single-select (radio): the set holds at most one id, and applying a new
///   id replaces the old one no matter what `checked` says;
/// - multi-select (checkbox): `checked == true` adds the id, `checked == false`
///   removes it.
///
/// Applying the same change twice is a no-op after the first application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    chosen: BTreeSet<AnswerId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a toggle for `answer_id`.
    pub fn apply(&mut self, answer_id: AnswerId, checked: bool, multiple: bool) {
        if multiple {
            if checked {
                self.chosen.insert(answer_id);
            } else {
                self.chosen.remove(&answer_id);
            }
        } else {
            // Radio semantics: only one id can ever be stored.
            self.chosen.clear();
            self.chosen.insert(answer_id);
        }
    }

    #[must_use]
    pub fn contains(&self, answer_id: AnswerId) -> bool {
        self.chosen.contains(&answer_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Chosen answer ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<AnswerId> {
        self.chosen.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_select_replaces_previous_choice() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(1), true, false);
        selection.apply(AnswerId::new(2), true, false);

        assert_eq!(selection.ids(), vec![AnswerId::new(2)]);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn single_select_ignores_unchecked_flag() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(1), false, false);

        assert!(selection.contains(AnswerId::new(1)));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn multi_select_adds_and_removes() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(1), true, true);
        selection.apply(AnswerId::new(2), true, true);
        selection.apply(AnswerId::new(1), false, true);

        assert_eq!(selection.ids(), vec![AnswerId::new(2)]);
    }

    #[test]
    fn apply_is_idempotent() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(5), true, true);
        let snapshot = selection.clone();
        selection.apply(AnswerId::new(5), true, true);
        assert_eq!(selection, snapshot);

        selection.apply(AnswerId::new(5), false, true);
        let snapshot = selection.clone();
        selection.apply(AnswerId::new(5), false, true);
        assert_eq!(selection, snapshot);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(9), false, true);
        assert!(selection.is_empty());
    }

    #[test]
    fn clear_empties_the_selection() {
        let mut selection = Selection::new();
        selection.apply(AnswerId::new(1), true, true);
        selection.apply(AnswerId::new(2), true, true);
        selection.clear();
        assert!(selection.is_empty());
    }
}
