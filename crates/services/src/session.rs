use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

use memoria_core::Clock;
use memoria_core::model::{
    Card, CardId, FORGOT_REQUEUE_AFTER, FileMeta, Mode, Rating, State, Statistics,
};
use storage::StateStore;

use crate::error::SessionError;
use crate::scheduler::build_queue;

/// Queue slot a forgotten card is reinserted at, relative to the cursor:
/// behind roughly `FORGOT_REQUEUE_AFTER` other cards.
const REQUEUE_OFFSET: usize = FORGOT_REQUEUE_AFTER as usize + 1;

//
// ─── UNDO ──────────────────────────────────────────────────────────────────────
//

/// Snapshot of a card as it was before one rating, plus where the cursor
/// stood. Owns a deep copy, independent of the live card.
#[derive(Debug, Clone)]
struct UndoEntry {
    card_id: CardId,
    snapshot: Card,
    cursor: usize,
}

//
// ─── SESSION ENGINE ────────────────────────────────────────────────────────────
//

/// The review session context: card store, active queue, cursor, undo stack
/// and statistics, behind a persistence boundary.
///
/// Everything runs on one thread; each public operation completes
/// synchronously and saves at the end. A failed save surfaces as
/// `SessionError::Storage` while the in-memory state stays valid.
pub struct SessionEngine {
    state: State,
    store: Rc<dyn StateStore>,
    clock: Clock,
    queue: Vec<CardId>,
    cursor: usize,
    undo: Vec<UndoEntry>,
    segment_started_at: DateTime<Utc>,
}

impl SessionEngine {
    /// Loads persisted state from the store and builds the first queue.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if an existing blob cannot be read.
    pub fn new(store: Rc<dyn StateStore>, clock: Clock) -> Result<Self, SessionError> {
        let state = store.load()?;
        let mut engine = Self {
            state,
            store,
            clock,
            queue: Vec::new(),
            cursor: 0,
            undo: Vec::new(),
            segment_started_at: clock.now(),
        };
        engine.rebuild_queue();
        Ok(engine)
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    /// The card under the cursor, if any.
    ///
    /// `None` both for an empty queue and for a cursor that points past the
    /// end (the latter happens after some undos and means "nothing due").
    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        self.queue
            .get(self.cursor)
            .and_then(|id| self.state.card(*id))
    }

    /// Cards left in the current pass, including the one under the cursor.
    #[must_use]
    pub fn queue_remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    #[must_use]
    pub fn queue(&self) -> &[CardId] {
        &self.queue
    }

    #[must_use]
    pub fn has_pending_initial_review(&self) -> bool {
        self.state.has_pending_initial_review()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.state.cards
    }

    #[must_use]
    pub fn files(&self) -> &[FileMeta] {
        &self.state.files
    }

    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.state.stats
    }

    /// Whether there is a rating to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Card counts by terminal-ish status: (mastered, unsure, forgot).
    #[must_use]
    pub fn status_breakdown(&self) -> (usize, usize, usize) {
        use memoria_core::model::CardStatus;
        let mastered = self.state.cards.iter().filter(|c| c.mastered).count();
        let unsure = self
            .state
            .cards
            .iter()
            .filter(|c| c.status == CardStatus::Unsure)
            .count();
        let forgot = self
            .state
            .cards
            .iter()
            .filter(|c| c.status == CardStatus::Forgot)
            .count();
        (mastered, unsure, forgot)
    }

    /// Seconds of study time since the last answer (or engine start).
    #[must_use]
    pub fn session_elapsed_seconds(&self) -> u64 {
        elapsed_seconds(self.segment_started_at, self.clock.now())
    }

    // ─── Commands ──────────────────────────────────────────────────────────

    /// Rates the card under the cursor and advances the session.
    ///
    /// A silent no-op when nothing is due: the UI loop prefers availability
    /// over strict signaling here. On "forgot" the same card is reinserted
    /// into the live queue behind roughly twenty others.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting the updated state
    /// fails; the in-memory state keeps the rating.
    pub fn rate_current(&mut self, rating: Rating) -> Result<(), SessionError> {
        let now = self.clock.now();
        let Some(&card_id) = self.queue.get(self.cursor) else {
            return Ok(());
        };
        let Some(card) = self.state.card_mut(card_id) else {
            return Ok(());
        };

        let snapshot = card.clone();
        card.apply_rating(rating, now);
        self.undo.push(UndoEntry {
            card_id,
            snapshot,
            cursor: self.cursor,
        });

        if rating == Rating::Forgot {
            let insert_at = (self.cursor + REQUEUE_OFFSET).min(self.queue.len());
            self.queue.insert(insert_at, card_id);
        }

        let elapsed = elapsed_seconds(self.segment_started_at, now);
        self.segment_started_at = now;
        self.state
            .stats
            .record_answer(rating, elapsed, now.date_naive());

        self.cursor += 1;
        if self.cursor >= self.queue.len() {
            // A just-forgotten tail card survives this rebuild: its due_at
            // equals now, so the due filter keeps it.
            self.rebuild_queue();
        }

        self.store.save(&self.state)?;
        Ok(())
    }

    /// Rates the current card from a raw UI label.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rating` for an unknown label, before any state
    /// is touched, and storage errors as in [`Self::rate_current`].
    pub fn rate_current_label(&mut self, label: &str) -> Result<(), SessionError> {
        let rating = Rating::parse(label)?;
        self.rate_current(rating)
    }

    /// Reverts the most recent rating.
    ///
    /// Restores the card's full prior state (status, due date, mastered
    /// flag, history), rebuilds the queue, and puts the cursor back where it
    /// was. The restored cursor is deliberately not clamped to the rebuilt
    /// queue length; past-the-end reads as "no card due". Statistics are
    /// not reversed.
    ///
    /// No-op when the undo stack is empty or the card is gone.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting fails.
    pub fn undo_last_rating(&mut self) -> Result<(), SessionError> {
        let Some(entry) = self.undo.pop() else {
            return Ok(());
        };
        let Some(card) = self.state.card_mut(entry.card_id) else {
            return Ok(());
        };
        *card = entry.snapshot;

        self.rebuild_queue();
        self.cursor = entry.cursor;

        self.store.save(&self.state)?;
        Ok(())
    }

    /// Switches the queue ordering mode and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InitialReviewPending` when sequential ordering
    /// is requested before every card has its first rating; the stored mode
    /// is forced back to random so callers can explain the rejection.
    /// Returns `SessionError::Storage` if persisting fails.
    pub fn set_mode(&mut self, mode: Mode) -> Result<Mode, SessionError> {
        if mode == Mode::Sequential && self.has_pending_initial_review() {
            self.state.mode = Mode::Random;
            self.rebuild_queue();
            self.store.save(&self.state)?;
            return Err(SessionError::InitialReviewPending);
        }
        self.state.mode = mode;
        self.rebuild_queue();
        self.store.save(&self.state)?;
        Ok(self.state.mode)
    }

    /// Appends freshly imported cards and records the file's metadata.
    ///
    /// Imported cards enter like any other unreviewed card: due immediately,
    /// part of the initial-review pass.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting fails.
    pub fn import_cards(
        &mut self,
        cards: Vec<Card>,
        meta: FileMeta,
    ) -> Result<usize, SessionError> {
        let count = cards.len();
        self.state.cards.extend(cards);
        self.state.files.push(meta);
        self.rebuild_queue();
        self.store.save(&self.state)?;
        Ok(count)
    }

    /// Puts a card back into rotation as "unsure", due now.
    ///
    /// Returns `Ok(false)` if no card has that id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting fails.
    pub fn restore_card(&mut self, id: CardId) -> Result<bool, SessionError> {
        let now = self.clock.now();
        let Some(card) = self.state.card_mut(id) else {
            return Ok(false);
        };
        card.restore(now);
        self.rebuild_queue();
        self.store.save(&self.state)?;
        Ok(true)
    }

    /// Rebuilds the queue from the current due set without persisting.
    pub fn reset_queue(&mut self) {
        self.rebuild_queue();
    }

    /// Advances a fixed clock; no effect on the wall clock.
    pub fn advance_clock(&mut self, delta: Duration) {
        self.clock.advance(delta);
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn rebuild_queue(&mut self) {
        let plan = build_queue(&self.state.cards, self.state.mode, self.clock.now());
        self.state.mode = plan.mode;
        self.queue = plan.queue;
        self.cursor = 0;
        log::debug!("queue rebuilt: {} cards", self.queue.len());
    }
}

fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("cards_len", &self.state.cards.len())
            .field("queue_len", &self.queue.len())
            .field("cursor", &self.cursor)
            .field("undo_len", &self.undo.len())
            .field("mode", &self.state.mode)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
