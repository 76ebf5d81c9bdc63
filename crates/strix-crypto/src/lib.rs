//! Content hashing and sandbox bearer-token generation.
//!
//! Strix does not sign run-store entries cryptographically — unlike
//! `astrid_audit::AuditEntry`, which chains ed25519 signatures for a
//! multi-tenant chain-of-custody requirement the specification doesn't carry
//! — so this crate keeps only the two ambient primitives that survive: content
//! hashing (for chain-linking trace entries) and bearer-token minting (for
//! sandbox worker authentication).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod hash;
pub mod token;

pub use hash::ContentHash;
pub use token::BearerToken;
