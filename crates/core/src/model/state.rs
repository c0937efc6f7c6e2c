use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::card::Card;
use crate::model::ids::CardId;
use crate::model::stats::Statistics;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Ordering of the review queue once every card has had its first rating.
///
/// While any card still awaits its initial review the queue is always
/// shuffled, whatever this is set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Random,
    Sequential,
}

//
// ─── FILE METADATA ─────────────────────────────────────────────────────────────
//

/// Provenance of one imported source file, shown in the import view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub columns: Vec<String>,
    pub imported_at: DateTime<Utc>,
    pub count: usize,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// The full persisted application state: the card store plus everything the
/// surrounding UI wants carried across restarts.
///
/// `theme`, `oni_mode` and `simple_mode` are opaque UI payload; the engine
/// stores them but never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub cards: Vec<Card>,
    pub files: Vec<FileMeta>,
    pub mode: Mode,
    pub theme: String,
    pub oni_mode: bool,
    pub simple_mode: bool,
    pub stats: Statistics,
}

impl Default for State {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            files: Vec::new(),
            mode: Mode::Random,
            theme: "dark".to_string(),
            oni_mode: false,
            simple_mode: false,
            stats: Statistics::default(),
        }
    }
}

impl State {
    /// True iff any non-mastered card has never been rated.
    #[must_use]
    pub fn has_pending_initial_review(&self) -> bool {
        self.cards.iter().any(Card::pending_initial)
    }

    /// Looks up a card by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Looks up a card by id for mutation.
    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::CardDraft;
    use crate::model::rating::Rating;
    use crate::time::fixed_now;

    fn build_card(word: &str) -> Card {
        CardDraft {
            word: word.into(),
            meaning: "meaning".into(),
            ..CardDraft::default()
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(CardId::random())
    }

    #[test]
    fn default_state_is_empty_dark_random() {
        let state = State::default();
        assert!(state.cards.is_empty());
        assert_eq!(state.mode, Mode::Random);
        assert_eq!(state.theme, "dark");
        assert!(!state.has_pending_initial_review());
    }

    #[test]
    fn pending_initial_review_tracks_unrated_cards() {
        let mut state = State::default();
        state.cards.push(build_card("a"));
        state.cards.push(build_card("b"));
        assert!(state.has_pending_initial_review());

        let now = fixed_now();
        for card in &mut state.cards {
            card.apply_rating(Rating::Normal, now);
        }
        assert!(!state.has_pending_initial_review());
    }

    #[test]
    fn mastered_unrated_cards_do_not_count_as_pending() {
        let mut state = State::default();
        let mut card = build_card("a");
        card.mastered = true;
        state.cards.push(card);
        assert!(!state.has_pending_initial_review());
    }

    #[test]
    fn card_lookup_by_id() {
        let mut state = State::default();
        let card = build_card("a");
        let id = card.id;
        state.cards.push(card);

        assert!(state.card(id).is_some());
        assert!(state.card(CardId::random()).is_none());

        state.card_mut(id).unwrap().mastered = true;
        assert!(state.card(id).unwrap().mastered);
    }
}
