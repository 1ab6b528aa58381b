// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod activity_log;
pub mod membership;
pub mod password;
pub mod streak;
pub mod tokens;

pub use membership::MemberProfile;
pub use tokens::TokenPair;
