//! Synthetic prospect context: emails and a team chat.
//!
//! Stands in for the mailbox and chat integrations a real deployment
//! would read from. Everything is derived from the company name.

mod emails;
mod teams;

pub use emails::generate_emails;
pub use teams::{generate_team_chat, CHAT_PARTICIPANTS};
