mod card;
mod ids;
mod rating;
mod state;
mod stats;

pub use card::{
    Card, CardDraft, CardError, CardStatus, FORGOT_REQUEUE_AFTER, ForgotRequeue, ValidatedCard,
    never_due,
};
pub use ids::{CardId, ParseIdError};
pub use rating::{Rating, RatingError, ReviewEvent};
pub use state::{FileMeta, Mode, State};
pub use stats::Statistics;
