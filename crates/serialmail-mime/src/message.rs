//! Mail message structure.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::address::{MailAddress, MailAddressCollection};
use crate::attachment::Attachment;
use crate::charset::Encoding;
use crate::error::Result;
use crate::header::HeaderCollection;

/// Content transfer encoding of a body or attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit data.
    EightBit,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Not chosen; picked at render time.
    #[default]
    Unknown,
    /// Base64 encoding.
    Base64,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MailPriority {
    /// Normal priority.
    #[default]
    Normal,
    /// Low priority.
    Low,
    /// High priority.
    High,
}

/// Delivery status notification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeliveryNotificationOptions(i32);

impl DeliveryNotificationOptions {
    /// No notification.
    pub const NONE: Self = Self(0);
    /// Notify on successful delivery.
    pub const ON_SUCCESS: Self = Self(1);
    /// Notify on failed delivery.
    pub const ON_FAILURE: Self = Self(2);
    /// Notify when delivery is delayed.
    pub const DELAY: Self = Self(4);
    /// Never notify.
    pub const NEVER: Self = Self(0x0800_0000);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Returns true if every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DeliveryNotificationOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DeliveryNotificationOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// An e-mail message ready to be rendered or handed to a transport.
///
/// Encodings left as `None` fall back to UTF-8 when rendering.
#[derive(Debug, Default)]
pub struct MailMessage {
    /// Author address.
    pub from: Option<MailAddress>,
    /// Actual sender when different from the author.
    pub sender: Option<MailAddress>,
    /// Primary recipients.
    pub to: MailAddressCollection,
    /// Carbon copy recipients.
    pub cc: MailAddressCollection,
    /// Blind carbon copy recipients (never rendered).
    pub bcc: MailAddressCollection,
    /// Reply-To addresses.
    pub reply_to_list: MailAddressCollection,
    /// Subject line.
    pub subject: String,
    /// Subject encoding.
    pub subject_encoding: Option<Encoding>,
    /// Body text.
    pub body: String,
    /// Body encoding.
    pub body_encoding: Option<Encoding>,
    /// Whether the body is HTML.
    pub is_body_html: bool,
    /// Body transfer encoding.
    pub body_transfer_encoding: TransferEncoding,
    /// Encoding used for custom header values.
    pub headers_encoding: Option<Encoding>,
    /// Priority.
    pub priority: MailPriority,
    /// Delivery status notification flags.
    pub delivery_notification_options: DeliveryNotificationOptions,
    /// Custom headers.
    pub headers: HeaderCollection,
    /// Attachments in order.
    pub attachments: Vec<Attachment>,
}

impl MailMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message from a sender and a comma-separated recipient list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] for empty input and
    /// [`crate::Error::InvalidFormat`] for malformed addresses.
    pub fn from_text(from: &str, to: &str) -> Result<Self> {
        let mut message = Self::new();
        message.from = Some(MailAddress::new(from)?);
        message.to.add_list(to)?;
        Ok(message)
    }

    /// Creates a message with sender, recipients, subject and body.
    ///
    /// # Errors
    ///
    /// Same as [`MailMessage::from_text`].
    pub fn with_content(from: &str, to: &str, subject: &str, body: &str) -> Result<Self> {
        let mut message = Self::from_text(from, to)?;
        message.subject = subject.to_string();
        message.body = body.to_string();
        Ok(message)
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
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::SevenBit.to_string(), "7bit");
        assert_eq!(TransferEncoding::Base64.to_string(), "base64");
        assert_eq!(
            TransferEncoding::QuotedPrintable.to_string(),
            "quoted-printable"
        );
        assert_eq!(TransferEncoding::default(), TransferEncoding::Unknown);
    }

    #[test]
    fn test_delivery_notification_flags() {
        let mut options = DeliveryNotificationOptions::ON_SUCCESS;
        options |= DeliveryNotificationOptions::DELAY;
        assert_eq!(options.bits(), 5);
        assert!(options.contains(DeliveryNotificationOptions::DELAY));
        assert!(!options.contains(DeliveryNotificationOptions::ON_FAILURE));
        assert_eq!(DeliveryNotificationOptions::default(), DeliveryNotificationOptions::NONE);
        assert_eq!(DeliveryNotificationOptions::NEVER.bits(), 0x0800_0000);
    }

    #[test]
    fn test_from_text() {
        let message = MailMessage::from_text("a@a.com", "b@b.com, c@c.com").unwrap();
        assert_eq!(message.from.unwrap().address(), "a@a.com");
        assert_eq!(message.to.len(), 2);
        assert_eq!(message.priority, MailPriority::Normal);
        assert_eq!(message.body_transfer_encoding, TransferEncoding::Unknown);
    }

    #[test]
    fn test_from_text_errors() {
        assert!(matches!(
            MailMessage::from_text("", "b@b.com"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            MailMessage::from_text("a@a.com", "nope"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_with_content() {
        let message = MailMessage::with_content("a@a.com", "b@b.com", "Hi", "Body").unwrap();
        assert_eq!(message.subject, "Hi");
        assert_eq!(message.body, "Body");
    }
}
