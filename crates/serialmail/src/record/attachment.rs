//! Serializable attachments and the attachment collection.

use std::io::{Cursor, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serialmail_mime::{Attachment, Encoding, TransferEncoding};
use tracing::{debug, trace};

use super::content::{ContentDispositionRecord, ContentTypeRecord};
use crate::error::{Error, Result};

/// Serializable counterpart of one attachment.
///
/// `content_bytes` always holds the complete payload captured at
/// conversion time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AttachmentRecord {
    /// Attachment name.
    pub name: Option<String>,
    /// Code page of the name encoding, absent when none was set.
    pub name_encoding_code_page: Option<i32>,
    /// Content id.
    pub content_id: Option<String>,
    /// Content type.
    pub content_type: ContentTypeRecord,
    /// Content disposition.
    pub content_disposition: ContentDispositionRecord,
    /// Transfer encoding.
    pub transfer_encoding: TransferEncoding,
    /// Captured payload.
    pub content_bytes: Vec<u8>,
}

impl AttachmentRecord {
    /// Captures a file as an `application/octet-stream` attachment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path and
    /// [`Error::Io`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_live(&mut Attachment::from_file(path)?)
    }

    /// Captures a file with the given media type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path,
    /// [`Error::InvalidFormat`] for a malformed media type and
    /// [`Error::Io`] if the file cannot be read.
    pub fn from_file_with_media_type(path: impl AsRef<Path>, media_type: Option<&str>) -> Result<Self> {
        Self::from_live(&mut Attachment::from_file_with_media_type(path, media_type)?)
    }

    /// Captures the content of a reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a malformed media type and
    /// [`Error::Io`] if the reader fails.
    pub fn from_reader(
        reader: impl Read,
        name: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<Self> {
        let bytes = read_all(reader)?;
        Self::from_live(&mut Attachment::with_name(
            Cursor::new(bytes),
            name,
            media_type,
        )?)
    }

    /// Captures the content of a reader with a full content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the content type is malformed
    /// and [`Error::Io`] if the reader fails.
    pub fn from_reader_with_type(reader: impl Read, content_type: &ContentTypeRecord) -> Result<Self> {
        let bytes = read_all(reader)?;
        Self::from_live(&mut Attachment::from_bytes(bytes, content_type.to_live()?))
    }

    /// Creates a `text/plain` UTF-8 attachment from a string.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in media type.
    pub fn from_string(content: &str, name: Option<&str>) -> Result<Self> {
        Self::from_live(&mut Attachment::from_string(content, name)?)
    }

    /// Creates a text attachment encoded with `encoding`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a malformed media type.
    pub fn from_string_with(
        content: &str,
        name: Option<&str>,
        encoding: Encoding,
        media_type: Option<&str>,
    ) -> Result<Self> {
        Self::from_live(&mut Attachment::from_string_with(
            content, name, encoding, media_type,
        )?)
    }

    /// Releases the captured payload. Calling it again has no effect.
    pub fn dispose(&mut self) {
        self.content_bytes = Vec::new();
    }

    pub(crate) fn from_live(attachment: &mut Attachment) -> Result<Self> {
        let content_bytes = attachment.read_content()?;
        trace!(
            name = attachment.name(),
            bytes = content_bytes.len(),
            "Captured attachment content"
        );
        Ok(Self {
            name: attachment.name().map(str::to_string),
            name_encoding_code_page: attachment.name_encoding().map(Encoding::code_page),
            content_id: attachment.content_id().map(str::to_string),
            content_type: ContentTypeRecord::from_live(attachment.content_type()),
            content_disposition: ContentDispositionRecord::from_live(
                attachment.content_disposition(),
            ),
            transfer_encoding: attachment.transfer_encoding(),
            content_bytes,
        })
    }

    pub(crate) fn to_live(&self) -> Result<Attachment> {
        let mut attachment =
            Attachment::from_bytes(self.content_bytes.clone(), self.content_type.to_live()?);
        attachment.set_name(self.name.clone());
        attachment.set_transfer_encoding(self.transfer_encoding);
        if let Some(code_page) = self.name_encoding_code_page {
            attachment.set_name_encoding(Some(Encoding::from_code_page(code_page)?));
        }
        attachment.set_content_id(self.content_id.clone());
        self.content_disposition
            .copy_into(attachment.content_disposition_mut())?;
        Ok(attachment)
    }
}

fn read_all(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

const COLLECTION: &str = "AttachmentCollection";

/// Ordered list of attachment records that owns their payloads.
///
/// After [`dispose`](Self::dispose) every mutation fails with
/// [`Error::ObjectDisposed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentCollection {
    records: Vec<AttachmentRecord>,
    #[serde(skip)]
    disposed: bool,
}

impl AttachmentCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `None` and
    /// [`Error::ObjectDisposed`] after disposal.
    pub fn push(&mut self, record: impl Into<Option<AttachmentRecord>>) -> Result<()> {
        let record = required(record.into())?;
        self.check_disposed()?;
        self.records.push(record);
        Ok(())
    }

    /// Inserts a record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `None` or an index past the
    /// end, and [`Error::ObjectDisposed`] after disposal.
    pub fn insert(
        &mut self,
        index: usize,
        record: impl Into<Option<AttachmentRecord>>,
    ) -> Result<()> {
        let record = required(record.into())?;
        self.check_disposed()?;
        if index > self.records.len() {
            return Err(out_of_range(index, self.records.len()));
        }
        self.records.insert(index, record);
        Ok(())
    }

    /// Replaces the record at `index`, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `None` or an index out of
    /// range, and [`Error::ObjectDisposed`] after disposal.
    pub fn set(
        &mut self,
        index: usize,
        record: impl Into<Option<AttachmentRecord>>,
    ) -> Result<AttachmentRecord> {
        let record = required(record.into())?;
        self.check_disposed()?;
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        Ok(std::mem::replace(slot, record))
    }

    /// Removes and returns the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectDisposed`] after disposal and
    /// [`Error::InvalidArgument`] for an index out of range.
    pub fn remove(&mut self, index: usize) -> Result<AttachmentRecord> {
        self.check_disposed()?;
        if index >= self.records.len() {
            return Err(out_of_range(index, self.records.len()));
        }
        Ok(self.records.remove(index))
    }

    /// Removes every record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectDisposed`] after disposal.
    pub fn clear(&mut self) -> Result<()> {
        self.check_disposed()?;
        self.records.clear();
        Ok(())
    }

    /// Disposes every record and empties the collection. Calling it again
    /// has no effect.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let count = self.records.len();
        for record in &mut self.records {
            record.dispose();
        }
        self.records.clear();
        self.disposed = true;
        debug!(attachments = count, "Disposed attachment collection");
    }

    /// Returns true once [`dispose`](Self::dispose) was called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AttachmentRecord> {
        self.records.get(index)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttachmentRecord> {
        self.records.iter()
    }

    const fn check_disposed(&self) -> Result<()> {
        if self.disposed {
            Err(Error::ObjectDisposed(COLLECTION))
        } else {
            Ok(())
        }
    }
}

fn required(record: Option<AttachmentRecord>) -> Result<AttachmentRecord> {
    record.ok_or_else(|| Error::argument("Attachment cannot be None"))
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::argument(format!("Index {index} is out of range for {len} attachments"))
}

impl<'a> IntoIterator for &'a AttachmentCollection {
    type Item = &'a AttachmentRecord;
    type IntoIter = std::slice::Iter<'a, AttachmentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<AttachmentRecord> for AttachmentCollection {
    fn from_iter<I: IntoIterator<Item = AttachmentRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
            disposed: false,
        }
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
    use std::io::Write;

    fn sample(name: &str) -> AttachmentRecord {
        AttachmentRecord::from_string("payload", Some(name)).unwrap()
    }

    #[test]
    fn test_from_string() {
        let record = AttachmentRecord::from_string("Hello", Some("hello.txt")).unwrap();
        assert_eq!(record.name.as_deref(), Some("hello.txt"));
        assert_eq!(record.content_type.media_type.as_deref(), Some("text/plain"));
        assert_eq!(record.content_type.char_set.as_deref(), Some("utf-8"));
        assert_eq!(record.content_bytes, b"Hello");
        assert_eq!(record.transfer_encoding, TransferEncoding::SevenBit);
        assert!(record.name_encoding_code_page.is_none());
    }

    #[test]
    fn test_from_string_with_encoding() {
        let record =
            AttachmentRecord::from_string_with("Grüße", Some("g.txt"), Encoding::LATIN1, None)
                .unwrap();
        assert_eq!(record.content_type.char_set.as_deref(), Some("iso-8859-1"));
        assert_eq!(record.content_bytes.len(), 5);
    }

    #[test]
    fn test_from_reader() {
        let record = AttachmentRecord::from_reader(
            Cursor::new(vec![0u8, 1, 2, 3]),
            Some("data.bin"),
            Some("application/x-custom"),
        )
        .unwrap();
        assert_eq!(record.content_type.media_type.as_deref(), Some("application/x-custom"));
        assert_eq!(record.content_type.name.as_deref(), Some("data.bin"));
        assert_eq!(record.content_bytes, [0, 1, 2, 3]);
        assert_eq!(record.transfer_encoding, TransferEncoding::Base64);
    }

    #[test]
    fn test_from_reader_with_type() {
        let content_type = ContentTypeRecord::parse("image/png; name=logo.png").unwrap();
        let record = AttachmentRecord::from_reader_with_type(&b"png"[..], &content_type).unwrap();
        assert_eq!(record.name.as_deref(), Some("logo.png"));
        assert_eq!(record.content_type, content_type);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 33]).unwrap();

        let record = AttachmentRecord::from_file_with_media_type(file.path(), Some("application/pdf")).unwrap();
        assert_eq!(record.content_bytes.len(), 33);
        assert_eq!(record.content_type.media_type.as_deref(), Some("application/pdf"));

        assert!(matches!(AttachmentRecord::from_file(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_to_live_unknown_name_code_page() {
        let mut record = sample("a.txt");
        record.name_encoding_code_page = Some(424242);
        assert!(matches!(record.to_live(), Err(Error::InvalidEncoding(424242))));
    }

    #[test]
    fn test_record_dispose_idempotent() {
        let mut record = sample("a.txt");
        record.dispose();
        record.dispose();
        assert!(record.content_bytes.is_empty());
    }

    #[test]
    fn test_collection_mutation() {
        let mut list = AttachmentCollection::new();
        list.push(sample("b")).unwrap();
        list.insert(0, sample("a")).unwrap();
        list.push(sample("c")).unwrap();
        let names: Vec<_> = list.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        let old = list.set(1, sample("B")).unwrap();
        assert_eq!(old.name.as_deref(), Some("b"));
        assert_eq!(list.remove(2).unwrap().name.as_deref(), Some("c"));
        assert_eq!(list.len(), 2);

        assert!(matches!(list.insert(5, sample("x")), Err(Error::InvalidArgument(_))));
        assert!(matches!(list.remove(5), Err(Error::InvalidArgument(_))));
        assert!(matches!(list.set(5, sample("x")), Err(Error::InvalidArgument(_))));

        list.clear().unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_collection_rejects_none() {
        let mut list = AttachmentCollection::new();
        assert!(matches!(list.push(None), Err(Error::InvalidArgument(_))));
        assert!(matches!(list.insert(0, None), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_collection_disposed() {
        let mut list: AttachmentCollection = [sample("a"), sample("b")].into_iter().collect();
        list.dispose();
        assert!(list.is_disposed());
        assert!(list.is_empty());

        assert!(matches!(list.push(sample("c")), Err(Error::ObjectDisposed(_))));
        assert!(matches!(list.insert(0, sample("c")), Err(Error::ObjectDisposed(_))));
        assert!(matches!(list.set(0, sample("c")), Err(Error::ObjectDisposed(_))));
        assert!(matches!(list.remove(0), Err(Error::ObjectDisposed(_))));
        assert!(matches!(list.clear(), Err(Error::ObjectDisposed(_))));

        // None is rejected before the disposal check.
        assert!(matches!(list.push(None), Err(Error::InvalidArgument(_))));

        list.dispose();
        assert!(list.is_disposed());
    }

    #[test]
    fn test_collection_serializes_as_sequence() {
        let list: AttachmentCollection = [sample("a")].into_iter().collect();
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["Name"], "a");
        assert_eq!(json[0]["ContentBytes"].as_array().unwrap().len(), 7);

        let back: AttachmentCollection = serde_json::from_value(json).unwrap();
        assert_eq!(back, list);
    }
}
