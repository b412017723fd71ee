//! # notes-service: Business Rules
//!
//! Two services, each stateless apart from the stores they hold:
//!
//! - [`AuthService`] registers users, authenticates them, issues session
//!   tokens, and resolves a token back to a live user.
//! - [`NoteService`] implements owner-scoped note CRUD and title search.
//!
//! Every note operation takes the acting [`notes_core::UserId`] as an
//! explicit argument. Update, delete and get check existence first and
//! ownership second, so a caller sees `NotFound` only for a note that truly
//! does not exist and `Forbidden` for a note that belongs to someone else.

pub mod auth;
pub mod notes;

pub use auth::{AuthService, AuthSession};
pub use notes::NoteService;
