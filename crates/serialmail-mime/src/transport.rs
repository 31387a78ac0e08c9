//! Message delivery seam.
//!
//! Network delivery lives outside this crate; the transports here keep
//! rendered messages in memory or drop them into a pickup directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::message::MailMessage;

/// Something that accepts finished messages.
pub trait Transport {
    /// Hands the message over for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be rendered or stored.
    fn send(&mut self, message: MailMessage) -> Result<()>;
}

/// In-memory transport that keeps every rendered message.
#[derive(Debug, Default)]
pub struct Outbox {
    messages: Vec<Vec<u8>>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rendered messages in send order.
    #[must_use]
    pub fn messages(&self) -> &[Vec<u8>] {
        &self.messages
    }

    /// Returns the number of messages sent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing was sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes and returns every stored message.
    pub fn take(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.messages)
    }
}

impl Transport for Outbox {
    fn send(&mut self, message: MailMessage) -> Result<()> {
        let rendered = message.render()?;
        debug!(bytes = rendered.len(), "Message queued in outbox");
        self.messages.push(rendered);
        Ok(())
    }
}

/// Transport that writes each message as an `.eml` file into a directory,
/// for pickup by a local mail server.
#[derive(Debug, Clone)]
pub struct PickupDirectory {
    path: PathBuf,
    sent: usize,
}

impl PickupDirectory {
    /// Creates a transport writing into `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sent: 0,
        }
    }

    /// Returns the target directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for PickupDirectory {
    fn send(&mut self, message: MailMessage) -> Result<()> {
        let rendered = message.render()?;
        fs::create_dir_all(&self.path)?;

        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%f");
        let file = self.path.join(format!("{stamp}-{}.eml", self.sent));
        fs::write(&file, &rendered)?;
        self.sent += 1;

        info!(path = %file.display(), bytes = rendered.len(), "Message written to pickup directory");
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_outbox_keeps_rendered_messages() {
        let mut outbox = Outbox::new();
        let message = MailMessage::with_content("a@a.com", "b@b.com", "One", "1").unwrap();
        outbox.send(message).unwrap();
        let message = MailMessage::with_content("a@a.com", "b@b.com", "Two", "2").unwrap();
        outbox.send(message).unwrap();

        assert_eq!(outbox.len(), 2);
        let first = String::from_utf8(outbox.messages()[0].clone()).unwrap();
        assert!(first.contains("Subject: One\r\n"));

        assert_eq!(outbox.take().len(), 2);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_outbox_rejects_unrenderable() {
        let mut outbox = Outbox::new();
        assert!(matches!(
            outbox.send(MailMessage::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_pickup_directory_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut pickup = PickupDirectory::new(dir.path().join("pickup"));
        pickup
            .send(MailMessage::with_content("a@a.com", "b@b.com", "s", "b").unwrap())
            .unwrap();
        pickup
            .send(MailMessage::with_content("a@a.com", "b@b.com", "s", "b").unwrap())
            .unwrap();

        let files: Vec<_> = fs::read_dir(pickup.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }
}
