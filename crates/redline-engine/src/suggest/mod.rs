//! Suggestion tracking: session state, the batch transformer, the span
//! locator, and the accept/reject resolver.

pub mod resolver;
pub mod session;
pub mod spans;
pub mod transformer;

pub use resolver::{Resolution, resolve_all, resolve_range};
pub use session::Session;
pub use spans::{SuggestionSpan, find_suggestion_spans};
pub use transformer::{Batch, Rewrite, intercept_batch};
