#![forbid(unsafe_code)]

pub mod error;
pub mod scheduler;
pub mod session;

pub use memoria_core::Clock;

pub use error::SessionError;
pub use scheduler::{QueuePlan, build_queue};
pub use session::SessionEngine;
