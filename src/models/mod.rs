//! Data models for sites, article revisions, and headline changes.

pub mod change;
pub mod revision;
pub mod site;

pub use change::HeadlineChange;
pub use revision::ArticleRevision;
pub use site::{NotifyCredentials, Site, prefix_matches};
