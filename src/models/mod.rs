// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod board;
pub mod health;
pub mod project;
pub mod streak;
pub mod todo;
pub mod user;

pub use activity::ActivityEvent;
pub use board::{BoardColumn, BoardTask};
pub use health::{HealthLog, HealthLogKind};
pub use project::{Member, MemberError, Project, ProjectKind, Role};
pub use streak::Streak;
pub use todo::{Priority, Todo, TodoStatus};
pub use user::{PublicUser, User};
