//! # API Route Modules
//!
//! - `auth`: signup, login and the current-user lookup. Signup and login
//!   are public; `/auth/me` sits behind the access middleware.
//! - `notes`: owner-scoped note CRUD and title search. Every route requires
//!   a bearer token.

pub mod auth;
pub mod notes;
