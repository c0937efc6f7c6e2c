use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;

use memoria_core::model::{Card, CardId, Mode};

/// An ordered review queue together with the mode it was actually built
/// under.
///
/// The mode in the plan can differ from the requested one: while any card
/// still awaits its first rating, the first pass must not be predictable, so
/// the plan comes back forced to `Mode::Random`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePlan {
    pub queue: Vec<CardId>,
    pub mode: Mode,
}

impl QueuePlan {
    /// Returns true when no cards were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Builds the review queue for the current pool of cards.
///
/// - Cards that never received their first rating take absolute priority:
///   the queue is a random permutation of exactly those, whatever `mode`
///   says.
/// - Otherwise the queue is every due, non-mastered card sorted ascending by
///   `due_at` (stable, so ties keep store order), shuffled when `mode` is
///   `Random`.
#[must_use]
pub fn build_queue(cards: &[Card], mode: Mode, now: DateTime<Utc>) -> QueuePlan {
    let mut pending: Vec<CardId> = cards
        .iter()
        .filter(|c| c.pending_initial())
        .map(|c| c.id)
        .collect();
    if !pending.is_empty() {
        pending.shuffle(&mut rng());
        return QueuePlan {
            queue: pending,
            mode: Mode::Random,
        };
    }

    let mut due: Vec<&Card> = cards.iter().filter(|c| c.is_due(now)).collect();
    due.sort_by_key(|c| c.due_at);

    let mut queue: Vec<CardId> = due.into_iter().map(|c| c.id).collect();
    if mode == Mode::Random {
        queue.shuffle(&mut rng());
    }
    QueuePlan { queue, mode }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use memoria_core::model::{CardDraft, Rating};
    use memoria_core::time::fixed_now;
    use std::collections::HashSet;

    fn build_card(word: &str) -> Card {
        CardDraft {
            word: word.into(),
            meaning: "m".into(),
            ..CardDraft::default()
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(CardId::random())
    }

    fn rated_card(word: &str, rating: Rating, at: DateTime<Utc>) -> Card {
        let mut card = build_card(word);
        card.apply_rating(rating, at);
        card
    }

    #[test]
    fn pending_initial_cards_preempt_everything() {
        let now = fixed_now();
        let due = rated_card("a", Rating::Forgot, now);
        let fresh1 = build_card("b");
        let fresh2 = build_card("c");
        let cards = vec![due.clone(), fresh1.clone(), fresh2.clone()];

        let plan = build_queue(&cards, Mode::Sequential, now);

        assert_eq!(plan.mode, Mode::Random);
        let ids: HashSet<CardId> = plan.queue.iter().copied().collect();
        assert_eq!(ids, HashSet::from([fresh1.id, fresh2.id]));
        assert!(!ids.contains(&due.id));
    }

    #[test]
    fn sequential_queue_sorts_by_due_date() {
        let now = fixed_now();
        // Due dates: now, now - 1 day, now - 3 days.
        let later = rated_card("a", Rating::Normal, now - Duration::days(2));
        let sooner = rated_card("b", Rating::Unsure, now - Duration::days(2));
        let earliest = rated_card("c", Rating::Forgot, now - Duration::days(3));
        let cards = vec![later.clone(), sooner.clone(), earliest.clone()];

        let plan = build_queue(&cards, Mode::Sequential, now);

        assert_eq!(plan.mode, Mode::Sequential);
        assert_eq!(plan.queue, vec![earliest.id, sooner.id, later.id]);
    }

    #[test]
    fn mastered_and_future_cards_are_excluded() {
        let now = fixed_now();
        let mastered = rated_card("a", Rating::Mastered, now);
        let future = rated_card("b", Rating::Normal, now);
        let due = rated_card("c", Rating::Forgot, now);
        let cards = vec![mastered, future, due.clone()];

        let plan = build_queue(&cards, Mode::Sequential, now);
        assert_eq!(plan.queue, vec![due.id]);
    }

    #[test]
    fn random_queue_keeps_the_same_due_set() {
        let now = fixed_now();
        let cards: Vec<Card> = (0..8)
            .map(|i| rated_card(&format!("w{i}"), Rating::Forgot, now))
            .collect();

        let plan = build_queue(&cards, Mode::Random, now);

        assert_eq!(plan.mode, Mode::Random);
        let expected: HashSet<CardId> = cards.iter().map(|c| c.id).collect();
        let actual: HashSet<CardId> = plan.queue.iter().copied().collect();
        assert_eq!(actual, expected);
        assert_eq!(plan.queue.len(), cards.len());
    }

    #[test]
    fn empty_pool_builds_empty_queue() {
        let plan = build_queue(&[], Mode::Random, fixed_now());
        assert!(plan.is_empty());
    }

    #[test]
    fn due_tie_break_keeps_store_order() {
        let now = fixed_now();
        let first = rated_card("a", Rating::Unsure, now - Duration::days(1));
        let second = rated_card("b", Rating::Unsure, now - Duration::days(1));
        let cards = vec![first.clone(), second.clone()];

        let plan = build_queue(&cards, Mode::Sequential, now);
        assert_eq!(plan.queue, vec![first.id, second.id]);
    }
}
