//! Services module
//!
//! Collaborator boundaries and pure helpers: the document store, the
//! outbound mailer, and the compiled CORS origin rules.

pub mod mailer;
pub mod origin;
pub mod store;

pub use mailer::{Envelope, HttpMailer, MailError, Mailer, MessageId, NoopMailer};
pub use origin::OriginRules;
pub use store::{DocumentStore, MemStore, PgStore, StoreError};
