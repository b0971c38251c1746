//! # Hackwhack (Hackathon Registration & Check-in)
//!
//! `hackwhack` is the API server behind the Hackwhack hackathon site. It
//! handles team registration with QR ticket generation and the admin
//! check-in console.
//!
//! ## Registration
//!
//! Teams register once with a contact email (unique) and an optional member
//! list. Each team receives an opaque scan code (`HACKWHACK-<uuid>`) rendered
//! as a PNG QR code and returned as a data URL for the frontend to display.
//!
//! ## Admin gate
//!
//! The admin console sits behind two sequential checks:
//!
//! 1. **Passkey:** a single shared secret, configured at startup.
//! 2. **Credentials:** per-admin email/password. The first login attempt for
//!    an unseen email provisions the account with that password (argon2id).
//!
//! Each gate sets its own `HttpOnly`, `SameSite=Strict` cookie with a 24 hour
//! expiry. Session state is entirely client-held; there is no server-side
//! session table.
//!
//! ## Check-in
//!
//! Scanning a team's code flips `checked_in` from false to true exactly once.
//! The transition is a single conditional `UPDATE ... WHERE checked_in =
//! FALSE`, so two near-simultaneous scans of the same code cannot both
//! succeed; the loser is reported as a conflict.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
