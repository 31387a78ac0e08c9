//! The top-level serializable message.

use serde::{Deserialize, Deserializer, Serialize};
use serialmail_mime::{DeliveryNotificationOptions, MailPriority, TransferEncoding};

use super::address::{AddressCollection, AddressRecord};
use super::attachment::AttachmentCollection;
use super::string_map::StringMap;
use crate::error::Result;

/// Serializable counterpart of a whole mail message.
///
/// Code pages are only present when the live message had an explicit
/// encoding for that part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MessageRecord {
    /// Author address.
    pub from: Option<AddressRecord>,
    /// Actual sender when different from the author.
    pub sender: Option<AddressRecord>,
    /// Primary recipients.
    pub to: AddressCollection,
    /// Carbon copy recipients.
    #[serde(rename = "CC")]
    pub cc: AddressCollection,
    /// Blind carbon copy recipients.
    pub bcc: AddressCollection,
    /// Reply-To addresses.
    pub reply_to_list: AddressCollection,
    #[serde(deserialize_with = "null_as_empty")]
    subject: String,
    /// Code page of the subject encoding.
    pub subject_code_page: Option<i32>,
    #[serde(deserialize_with = "null_as_empty")]
    body: String,
    /// Code page of the body encoding.
    pub body_code_page: Option<i32>,
    /// Code page of the header value encoding.
    pub headers_code_page: Option<i32>,
    /// Whether the body is HTML.
    pub is_body_html: bool,
    /// Body transfer encoding.
    pub body_transfer_encoding: TransferEncoding,
    /// Priority.
    pub priority: MailPriority,
    /// Delivery status notification flags.
    pub delivery_notification_options: DeliveryNotificationOptions,
    /// Custom headers.
    pub headers: StringMap,
    /// Attachments in order.
    pub attachments: AttachmentCollection,
}

impl MessageRecord {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message from a sender and a single recipient.
    #[must_use]
    pub fn from_addresses(from: AddressRecord, to: AddressRecord) -> Self {
        let mut message = Self::new();
        message.from = Some(from);
        message.to.push(to);
        message
    }

    /// Creates a message from a sender and a comma-separated recipient list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] for empty input and
    /// [`crate::Error::InvalidFormat`] for malformed addresses.
    pub fn from_text(from: &str, to: &str) -> Result<Self> {
        let mut message = Self::new();
        message.from = Some(AddressRecord::parse(from)?);
        message.to.append(to)?;
        Ok(message)
    }

    /// Creates a message with sender, recipients, subject and body.
    ///
    /// # Errors
    ///
    /// Same as [`MessageRecord::from_text`].
    pub fn with_content(
        from: &str,
        to: &str,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Result<Self> {
        let mut message = Self::from_text(from, to)?;
        message.set_subject(subject);
        message.set_body(body);
        Ok(message)
    }

    /// Returns the subject, empty if none.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Sets the subject; `None` clears it.
    pub fn set_subject(&mut self, subject: Option<&str>) {
        self.subject = subject.unwrap_or_default().to_string();
    }

    /// Returns the body, empty if none.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Sets the body; `None` clears it.
    pub fn set_body(&mut self, body: Option<&str>) {
        self.body = body.unwrap_or_default().to_string();
    }

    /// Serializes the message as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serde`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the message as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serde`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a message from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serde`] for invalid JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reads a missing or `null` text field as an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
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
    fn test_defaults() {
        let message = MessageRecord::new();
        assert_eq!(message.subject(), "");
        assert_eq!(message.body(), "");
        assert_eq!(message.body_transfer_encoding, TransferEncoding::Unknown);
        assert_eq!(message.priority, MailPriority::Normal);
        assert_eq!(
            message.delivery_notification_options,
            DeliveryNotificationOptions::NONE
        );
        assert!(message.subject_code_page.is_none());
    }

    #[test]
    fn test_none_setters_keep_text_non_null() {
        let mut message = MessageRecord::new();
        message.set_subject(Some("Hi"));
        message.set_subject(None);
        assert_eq!(message.subject(), "");
        message.set_body(None);
        assert_eq!(message.body(), "");
    }

    #[test]
    fn test_with_content() {
        let message =
            MessageRecord::with_content("a@a.com", "b@b.com, c@c.com", Some("S"), None).unwrap();
        assert_eq!(message.from.as_ref().unwrap().address, "a@a.com");
        assert_eq!(message.to.len(), 2);
        assert_eq!(message.subject(), "S");
        assert_eq!(message.body(), "");
    }

    #[test]
    fn test_from_text_errors() {
        assert!(matches!(
            MessageRecord::from_text("", "b@b.com"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            MessageRecord::from_text("a@a.com", "b@@b.com"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_from_addresses() {
        let from = AddressRecord::parse("a@a.com").unwrap();
        let to = AddressRecord::parse("b@b.com").unwrap();
        let message = MessageRecord::from_addresses(from.clone(), to);
        assert_eq!(message.from, Some(from));
        assert_eq!(message.to.len(), 1);
    }

    #[test]
    fn test_json_wire_names() {
        let mut message = MessageRecord::from_text("a@a.com", "b@b.com").unwrap();
        message.cc.append("c@c.com").unwrap();
        message.headers.insert("X-Tag", "1");
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["From"]["Address"], "a@a.com");
        assert_eq!(json["To"][0]["Address"], "b@b.com");
        assert_eq!(json["CC"][0]["Address"], "c@c.com");
        assert_eq!(json["Headers"][0]["Name"], "X-Tag");
        assert_eq!(json["Subject"], "");
        assert!(json["SubjectCodePage"].is_null());
        assert_eq!(json["BodyTransferEncoding"], "Unknown");
        assert_eq!(json["DeliveryNotificationOptions"], 0);
    }

    #[test]
    fn test_from_json_missing_fields() {
        let message = MessageRecord::from_json(r#"{"Subject": "Only"}"#).unwrap();
        assert_eq!(message.subject(), "Only");
        assert!(message.from.is_none());
        assert!(message.attachments.is_empty());

        let message = MessageRecord::from_json(r#"{"Subject": null, "Body": null}"#).unwrap();
        assert_eq!(message.subject(), "");
        assert_eq!(message.body(), "");

        assert!(matches!(MessageRecord::from_json("not json"), Err(Error::Serde(_))));
    }
}
