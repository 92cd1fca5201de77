//! # Vault Update Feed
//!
//! Every commit to the store yields exactly one `Update`, published to all
//! current subscribers before the commit returns.
//!
//! - **Update**: consumed and produced states of one commit
//! - **Publisher**: subscriber registry and fan-out
//! - **Subscription**: per-subscriber channel with explicit release

mod errors;
mod publisher;
mod subscription;
mod update;

pub use errors::{RealtimeError, RealtimeResult};
pub use publisher::{PublishResult, UpdatePublisher, DEFAULT_MAX_SUBSCRIBERS};
pub use subscription::{UpdateFilter, UpdateSubscription};
pub use update::Update;
