//! Commit ordering
//!
//! This module provides:
//! - `CommitId` - Totally ordered commit identity
//! - `ReadView` - Stable snapshot boundary
//! - `CommitAuthority` - Commit identity assignment

mod commit_authority;
mod commit_id;
mod read_view;

pub use commit_authority::{CommitAuthority, CommitAuthorityError};
pub use commit_id::CommitId;
pub use read_view::ReadView;
