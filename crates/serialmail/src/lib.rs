//! # serialmail
//!
//! Lossless conversion between live mail messages and plain serializable
//! records.
//!
//! A live [`MailMessage`] holds attachment streams and encoding objects
//! that cannot be persisted. [`MessageRecord`] mirrors it with plain data:
//! encodings become code page numbers and attachment streams become bytes.
//! The [`Converter`] maps between the two in both directions.
//!
//! ```no_run
//! use serialmail::{MessageRecord, to_live, to_record};
//! use serialmail_mime::MailMessage;
//!
//! # fn main() -> serialmail::Result<()> {
//! let mut live = MailMessage::with_content("a@example.com", "b@example.com", "Hi", "Body")?;
//! let record = to_record(&mut live)?;
//! let json = record.to_json()?;
//! let back = to_live(&MessageRecord::from_json(&json)?)?;
//! assert_eq!(back.subject, "Hi");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod codepage;
mod config;
mod convert;
mod error;
pub mod record;

pub use codepage::{DisplayNameCodePage, EncodingIntrospection, NoIntrospection};
pub use config::{ConvertConfig, ConvertConfigBuilder, UTF8_CODE_PAGE};
pub use convert::Converter;
pub use error::{Error, Result};
pub use record::{
    AddressCollection, AddressRecord, AttachmentCollection, AttachmentRecord,
    ContentDispositionRecord, ContentTypeRecord, MessageRecord, StringMap,
};

use serialmail_mime::MailMessage;

/// Converts a live message with the default [`Converter`].
///
/// # Errors
///
/// See [`Converter::message_to_record`].
pub fn to_record(message: &mut MailMessage) -> Result<MessageRecord> {
    Converter::new(ConvertConfig::default()).message_to_record(message)
}

/// Rebuilds a live message with the default [`Converter`].
///
/// # Errors
///
/// See [`Converter::message_to_live`].
pub fn to_live(record: &MessageRecord) -> Result<MailMessage> {
    Converter::new(ConvertConfig::default()).message_to_live(record)
}
