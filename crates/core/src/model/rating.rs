use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when interpreting rating input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("invalid rating value: {0}")]
    InvalidRating(String),
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// Four-level self-assessment applied to a card during review.
///
/// - `Mastered`: the word is fully learned; the card leaves the rotation
/// - `Normal`: recalled fine; the card comes back in two days
/// - `Unsure`: shaky recall; the card comes back tomorrow
/// - `Forgot`: failed recall; the card stays due and is requeued shortly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Mastered,
    Normal,
    Unsure,
    Forgot,
}

impl Rating {
    /// Parses a rating label as it arrives from the UI layer.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidRating` for anything outside the four
    /// known labels. Nothing is mutated on rejection.
    pub fn parse(value: &str) -> Result<Self, RatingError> {
        match value {
            "mastered" => Ok(Self::Mastered),
            "normal" => Ok(Self::Normal),
            "unsure" => Ok(Self::Unsure),
            "forgot" => Ok(Self::Forgot),
            other => Err(RatingError::InvalidRating(other.to_string())),
        }
    }

    /// Stable label for persistence and display plumbing.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mastered => "mastered",
            Self::Normal => "normal",
            Self::Unsure => "unsure",
            Self::Forgot => "forgot",
        }
    }

    /// Whether this rating counts as successful recall for accuracy purposes.
    ///
    /// Only `Mastered` and `Normal` do; `Unsure` and `Forgot` do not.
    #[must_use]
    pub fn is_correct_like(self) -> bool {
        matches!(self, Self::Mastered | Self::Normal)
    }
}

//
// ─── REVIEW EVENT ─────────────────────────────────────────────────────────────
//

/// One entry in a card's append-only review history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub at: DateTime<Utc>,
    pub rating: Rating,
}

impl ReviewEvent {
    #[must_use]
    pub fn new(rating: Rating, at: DateTime<Utc>) -> Self {
        Self { at, rating }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn parse_accepts_known_labels() {
        assert_eq!(Rating::parse("mastered").unwrap(), Rating::Mastered);
        assert_eq!(Rating::parse("normal").unwrap(), Rating::Normal);
        assert_eq!(Rating::parse("unsure").unwrap(), Rating::Unsure);
        assert_eq!(Rating::parse("forgot").unwrap(), Rating::Forgot);
    }

    #[test]
    fn parse_rejects_unknown_labels() {
        let err = Rating::parse("easy").unwrap_err();
        assert!(matches!(err, RatingError::InvalidRating(v) if v == "easy"));
    }

    #[test]
    fn labels_roundtrip() {
        for rating in [Rating::Mastered, Rating::Normal, Rating::Unsure, Rating::Forgot] {
            assert_eq!(Rating::parse(rating.as_str()).unwrap(), rating);
        }
    }

    #[test]
    fn correct_like_covers_mastered_and_normal_only() {
        assert!(Rating::Mastered.is_correct_like());
        assert!(Rating::Normal.is_correct_like());
        assert!(!Rating::Unsure.is_correct_like());
        assert!(!Rating::Forgot.is_correct_like());
    }

    #[test]
    fn event_creation_works() {
        let event = ReviewEvent::new(Rating::Normal, fixed_now());
        assert_eq!(event.rating, Rating::Normal);
        assert_eq!(event.at, fixed_now());
    }
}
