//! External collaborator services.

pub mod notifier;

pub use notifier::{Notifier, WebhookNotifier};
