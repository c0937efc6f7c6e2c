use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CardId;
use crate::model::rating::{Rating, ReviewEvent};

/// Sentinel due date meaning "never due again".
#[must_use]
pub fn never_due() -> DateTime<Utc> {
    DateTime::<Utc>::MAX_UTC
}

/// How many other cards a forgotten card should wait behind before
/// reappearing. Recorded in `ForgotRequeue` for the persisted blob; the
/// positional insert in the session engine is what actually uses the value.
pub const FORGOT_REQUEUE_AFTER: u32 = 20;

//
// ─── CARD STATUS ───────────────────────────────────────────────────────────────
//

/// Lifecycle status of a card, mirroring the last rating it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    /// Imported but never rated.
    #[default]
    New,
    Mastered,
    Normal,
    Unsure,
    Forgot,
}

impl From<Rating> for CardStatus {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Mastered => Self::Mastered,
            Rating::Normal => Self::Normal,
            Rating::Unsure => Self::Unsure,
            Rating::Forgot => Self::Forgot,
        }
    }
}

//
// ─── FORGOT REQUEUE ────────────────────────────────────────────────────────────
//

/// Bookkeeping written when a card is rated "forgot".
///
/// Kept for blob compatibility with older state; no scheduling path reads it
/// back. The live requeue is a one-shot positional insert into the session
/// queue, not a decaying counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotRequeue {
    pub after: u32,
    pub from: DateTime<Utc>,
}

//
// ─── CARD DRAFT ────────────────────────────────────────────────────────────────
//

/// Raw card fields as produced by the import pipeline, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardDraft {
    pub number: String,
    pub word: String,
    pub meaning: String,
    pub example: String,
    pub example_ja: String,
    pub emoji: String,
    pub source: String,
}

impl CardDraft {
    /// Validates the draft into a card ready for id assignment.
    ///
    /// Rows without a word or a meaning are useless as flashcards and are
    /// rejected here, matching the import filter.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyWord` or `CardError::EmptyMeaning`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedCard, CardError> {
        if self.word.trim().is_empty() {
            return Err(CardError::EmptyWord);
        }
        if self.meaning.trim().is_empty() {
            return Err(CardError::EmptyMeaning);
        }
        Ok(ValidatedCard {
            draft: self,
            imported_at: now,
        })
    }
}

/// A draft that passed validation; assign an id to obtain a `Card`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    draft: CardDraft,
    imported_at: DateTime<Utc>,
}

impl ValidatedCard {
    /// Produces a freshly imported, never-reviewed card that is due
    /// immediately.
    #[must_use]
    pub fn assign_id(self, id: CardId) -> Card {
        Card {
            id,
            number: self.draft.number,
            word: self.draft.word,
            meaning: self.draft.meaning,
            example: self.draft.example,
            example_ja: self.draft.example_ja,
            emoji: self.draft.emoji,
            source: self.draft.source,
            initial_reviewed: false,
            status: CardStatus::New,
            due_at: self.imported_at,
            mastered: false,
            forgot_requeue: None,
            history: Vec::new(),
        }
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A unit of vocabulary with its scheduling state and review history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub number: String,
    pub word: String,
    pub meaning: String,
    pub example: String,
    pub example_ja: String,
    pub emoji: String,
    pub source: String,
    pub initial_reviewed: bool,
    pub status: CardStatus,
    pub due_at: DateTime<Utc>,
    pub mastered: bool,
    pub forgot_requeue: Option<ForgotRequeue>,
    pub history: Vec<ReviewEvent>,
}

impl Card {
    /// True when the card should be offered for review at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.mastered && self.due_at <= now
    }

    /// True when the card still awaits its first-ever rating.
    #[must_use]
    pub fn pending_initial(&self) -> bool {
        !self.mastered && !self.initial_reviewed
    }

    /// Applies a rating at `now`: marks the initial review done, records the
    /// history event, and reschedules per the fixed rule table.
    ///
    /// | rating   | due_at       | mastered |
    /// |----------|--------------|----------|
    /// | mastered | never        | true     |
    /// | normal   | now + 2 days | false    |
    /// | unsure   | now + 1 day  | false    |
    /// | forgot   | now          | false    |
    pub fn apply_rating(&mut self, rating: Rating, now: DateTime<Utc>) {
        self.initial_reviewed = true;
        self.status = rating.into();
        self.history.push(ReviewEvent::new(rating, now));
        match rating {
            Rating::Mastered => {
                self.mastered = true;
                self.due_at = never_due();
            }
            Rating::Normal => {
                self.mastered = false;
                self.due_at = now + Duration::days(2);
            }
            Rating::Unsure => {
                self.mastered = false;
                self.due_at = now + Duration::days(1);
            }
            Rating::Forgot => {
                self.mastered = false;
                self.due_at = now;
                self.forgot_requeue = Some(ForgotRequeue {
                    after: FORGOT_REQUEUE_AFTER,
                    from: now,
                });
            }
        }
    }

    /// Puts a card back into rotation as "unsure", due immediately.
    ///
    /// Used by the deck view's restore action. `initial_reviewed` is left
    /// untouched.
    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.mastered = false;
        self.status = CardStatus::Unsure;
        self.due_at = now;
    }

    /// Compares a typed answer against the word, ignoring surrounding
    /// whitespace and letter case.
    #[must_use]
    pub fn matches_answer(&self, input: &str) -> bool {
        self.word.trim().to_lowercase() == input.trim().to_lowercase()
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card word must not be empty")]
    EmptyWord,

    #[error("card meaning must not be empty")]
    EmptyMeaning,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
