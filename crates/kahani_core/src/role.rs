//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
///
/// Serializes to the lowercase names the OpenAI-compatible chat APIs expect.
///
/// # Examples
///
/// ```
/// use kahani_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt carrying the stage instructions
    #[display("system")]
    System,
    /// Human template filled with the stage inputs
    #[display("user")]
    User,
    /// Model reply
    #[display("assistant")]
    Assistant,
}
