//! Serializable message records.
//!
//! Plain data types mirroring the live mail object model. Encodings are
//! stored as code page numbers and attachment content as captured bytes.

mod address;
mod attachment;
mod content;
mod message;
mod string_map;

pub use address::{AddressCollection, AddressRecord};
pub use attachment::{AttachmentCollection, AttachmentRecord};
pub use content::{ContentDispositionRecord, ContentTypeRecord};
pub use message::MessageRecord;
pub use string_map::StringMap;
