pub mod decoders;
pub mod gmail_client;

use crate::domain::email::{MessageDetail, MessageId, MessageSummary};
use crate::error::ProviderError;

pub use gmail_client::GmailClient;

/// What the session needs from a mailbox.
pub trait MailClient {
    /// Newest messages in provider order; one request per message, no retry.
    /// Ids that vanish before their fetch are left out rather than failing the listing.
    fn list_messages(&self, max_results: u32) -> Result<Vec<MessageSummary>, ProviderError>;

    /// Fails with `ProviderError::NotFound` when the id no longer exists.
    fn get_message(&self, id: &MessageId) -> Result<MessageDetail, ProviderError>;
}
