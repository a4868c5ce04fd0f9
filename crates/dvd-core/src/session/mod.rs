//! Per-session detection state.
//!
//! A session is one browsing context (a tab). It holds at most one
//! [`Candidate`] per media kind; the [`SessionRegistry`] owns every session
//! record and hands out [`SessionSnapshot`] copies.

mod candidate;
mod registry;

pub use candidate::{epoch_millis, Candidate, SessionId, SessionSnapshot};
pub use registry::{Admission, SessionRegistry};
