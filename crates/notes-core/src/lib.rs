//! # notes-core: Foundational Types for the Notes Service
//!
//! Every other crate in the workspace depends on `notes-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `UserId` and `NoteId` cannot be
//!    swapped for one another at a call site.
//!
//! 2. **No hash on the outward type.** [`PublicUser`] has no password hash
//!    field, so handlers that only see it cannot leak one.
//!
//! 3. **Validated constructors.** [`NoteDraft::new`] is the only way to build
//!    the title/content pair the note service persists.
//!
//! 4. **Store contracts, not store engines.** [`store::CredentialStore`] and
//!    [`store::NoteStore`] describe the document store this service talks to.
//!    [`store::MemoryStore`] is the in-process implementation used in
//!    development and tests.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `notes-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod model;
pub mod store;
pub mod validation;

pub use error::{DomainError, StoreError};
pub use identity::{NoteId, UserId};
pub use model::{Note, NoteDraft, PublicUser, User, UserIdentity};
pub use store::{CredentialStore, MemoryStore, NewNote, NewUser, NoteStore};
pub use validation::FieldError;
