//! # serialmail-mime
//!
//! In-memory mail message object model.
//!
//! ## Features
//!
//! - **Messages**: sender, recipients, subject, body, custom headers and attachments
//! - **Encodings**: text encodings addressed by Windows code page number
//! - **Attachments**: stream-backed content with content type and disposition
//! - **Rendering**: RFC 5322 output with RFC 2047 encoded words and `multipart/mixed`
//! - **Transports**: in-memory outbox and pickup directory
//!
//! ## Quick Start
//!
//! ```ignore
//! use serialmail_mime::{Attachment, Encoding, MailMessage, Outbox, Transport};
//!
//! let mut message = MailMessage::with_content(
//!     "sender@example.com",
//!     "alice@example.com, bob@example.com",
//!     "Quarterly report",
//!     "See attached.",
//! )?;
//! message.subject_encoding = Some(Encoding::UTF8);
//! message
//!     .attachments
//!     .push(Attachment::from_string("totals", Some("report.txt"))?);
//!
//! let mut outbox = Outbox::new();
//! outbox.send(message)?;
//! ```
//!
//! ### Encoded words
//!
//! ```ignore
//! use serialmail_mime::Encoding;
//! use serialmail_mime::encoding::encode_rfc2047;
//!
//! let latin1 = Encoding::from_code_page(28591)?;
//! let word = encode_rfc2047("Grüße", &latin1);
//! assert!(word.starts_with("=?iso-8859-1?B?"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod attachment;
mod charset;
mod content_type;
mod disposition;
mod error;
mod header;
mod message;
mod params;
mod render;
mod transport;

pub mod encoding;

pub use address::{MailAddress, MailAddressCollection};
pub use attachment::Attachment;
pub use charset::Encoding;
pub use content_type::{ContentType, DEFAULT_MEDIA_TYPE};
pub use disposition::{ATTACHMENT, ContentDisposition, INLINE, RFC2822_YEARS, TYPED_PARAMETERS};
pub use error::{Error, Result};
pub use header::HeaderCollection;
pub use message::{DeliveryNotificationOptions, MailMessage, MailPriority, TransferEncoding};
pub use params::Parameters;
pub use transport::{Outbox, PickupDirectory, Transport};
