//! Stream-backed message attachments.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use crate::charset::Encoding;
use crate::content_type::ContentType;
use crate::disposition::ContentDisposition;
use crate::error::{Error, Result};
use crate::message::TransferEncoding;

/// Attachment whose content is read from a stream when the message is
/// rendered or captured.
pub struct Attachment {
    content: Box<dyn Read + Send>,
    content_type: ContentType,
    name: Option<String>,
    name_encoding: Option<Encoding>,
    content_id: Option<String>,
    transfer_encoding: TransferEncoding,
    content_disposition: ContentDisposition,
}

impl Attachment {
    /// Creates an attachment reading from `content`.
    ///
    /// The attachment name is taken from the `name` parameter of the
    /// content type.
    pub fn new(content: impl Read + Send + 'static, content_type: ContentType) -> Self {
        let name = content_type.name().map(str::to_string);
        Self {
            content: Box::new(content),
            content_type,
            name,
            name_encoding: None,
            content_id: None,
            transfer_encoding: TransferEncoding::Base64,
            content_disposition: ContentDisposition::new(),
        }
    }

    /// Creates a named attachment with an optional media type
    /// (`application/octet-stream` when absent).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the media type is malformed.
    pub fn with_name(
        content: impl Read + Send + 'static,
        name: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<Self> {
        let mut content_type = match media_type {
            Some(media_type) => ContentType::with_media_type(media_type)?,
            None => ContentType::new(),
        };
        content_type.set_name(name);
        Ok(Self::new(content, content_type))
    }

    /// Creates an attachment over an in-memory buffer.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, content_type: ContentType) -> Self {
        Self::new(Cursor::new(bytes), content_type)
    }

    /// Creates a `text/plain` UTF-8 attachment from a string.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in media type; kept fallible to match
    /// [`Attachment::from_string_with`].
    pub fn from_string(content: &str, name: Option<&str>) -> Result<Self> {
        Self::from_string_with(content, name, Encoding::UTF8, None)
    }

    /// Creates a text attachment from a string encoded with `encoding`.
    ///
    /// The media type defaults to `text/plain`; its charset parameter is
    /// set to the encoding's charset name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the media type is malformed.
    pub fn from_string_with(
        content: &str,
        name: Option<&str>,
        encoding: Encoding,
        media_type: Option<&str>,
    ) -> Result<Self> {
        let mut content_type = ContentType::with_media_type(media_type.unwrap_or("text/plain"))?;
        content_type.set_charset(Some(encoding.name()));
        content_type.set_name(name);

        let bytes = encoding.encode(content).into_owned();
        let mut attachment = Self::from_bytes(bytes, content_type);
        attachment.transfer_encoding = if content.is_ascii() {
            TransferEncoding::SevenBit
        } else {
            TransferEncoding::QuotedPrintable
        };
        Ok(attachment)
    }

    /// Opens a file as an `application/octet-stream` attachment named after
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path and
    /// [`Error::Io`] if the file cannot be opened.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_media_type(path, None)
    }

    /// Opens a file as an attachment with the given media type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path,
    /// [`Error::InvalidFormat`] for a malformed media type and
    /// [`Error::Io`] if the file cannot be opened.
    pub fn from_file_with_media_type(
        path: impl AsRef<Path>,
        media_type: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::argument("Attachment path cannot be empty"));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let file = File::open(path)?;
        Self::with_name(file, name.as_deref(), media_type)
    }

    /// Reads the remaining content to the end.
    ///
    /// The stream is consumed: a second call returns only what was not
    /// read before.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn read_content(&mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.content.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Returns the attachment name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets or clears the attachment name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Returns the explicitly assigned name encoding.
    #[must_use]
    pub const fn name_encoding(&self) -> Option<&Encoding> {
        self.name_encoding.as_ref()
    }

    /// Sets or clears the name encoding.
    pub const fn set_name_encoding(&mut self, encoding: Option<Encoding>) {
        self.name_encoding = encoding;
    }

    /// Returns the content id.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    /// Sets or clears the content id.
    pub fn set_content_id(&mut self, content_id: Option<String>) {
        self.content_id = content_id;
    }

    /// Returns the transfer encoding.
    #[must_use]
    pub const fn transfer_encoding(&self) -> TransferEncoding {
        self.transfer_encoding
    }

    /// Sets the transfer encoding.
    pub const fn set_transfer_encoding(&mut self, transfer_encoding: TransferEncoding) {
        self.transfer_encoding = transfer_encoding;
    }

    /// Returns the content disposition.
    #[must_use]
    pub const fn content_disposition(&self) -> &ContentDisposition {
        &self.content_disposition
    }

    /// Returns the content disposition for in-place updates.
    pub const fn content_disposition_mut(&mut self) -> &mut ContentDisposition {
        &mut self.content_disposition
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("content_type", &self.content_type)
            .field("name", &self.name)
            .field("name_encoding", &self.name_encoding)
            .field("content_id", &self.content_id)
            .field("transfer_encoding", &self.transfer_encoding)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
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

    #[test]
    fn test_new_takes_name_from_content_type() {
        let ct = ContentType::parse("application/pdf; name=report.pdf").unwrap();
        let attachment = Attachment::from_bytes(vec![1, 2, 3], ct);
        assert_eq!(attachment.name(), Some("report.pdf"));
        assert_eq!(attachment.transfer_encoding(), TransferEncoding::Base64);
        assert_eq!(attachment.content_disposition().disposition_type(), "attachment");
    }

    #[test]
    fn test_read_content_consumes_stream() {
        let mut attachment = Attachment::from_bytes(b"abc".to_vec(), ContentType::new());
        assert_eq!(attachment.read_content().unwrap(), b"abc");
        assert!(attachment.read_content().unwrap().is_empty());
    }

    #[test]
    fn test_from_string_with_encoding() {
        let mut attachment =
            Attachment::from_string_with("Héllo", Some("a.txt"), Encoding::LATIN1, None).unwrap();
        assert_eq!(attachment.content_type().media_type(), "text/plain");
        assert_eq!(attachment.content_type().charset(), Some("iso-8859-1"));
        assert_eq!(attachment.name(), Some("a.txt"));
        assert_eq!(attachment.transfer_encoding(), TransferEncoding::QuotedPrintable);
        assert_eq!(attachment.read_content().unwrap(), [b'H', 0xE9, b'l', b'l', b'o']);
    }

    #[test]
    fn test_with_name_bad_media_type() {
        let result = Attachment::with_name(Cursor::new(Vec::new()), Some("x"), Some("bogus"));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file body").unwrap();

        let mut attachment = Attachment::from_file(file.path()).unwrap();
        let expected = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(attachment.name(), Some(expected.as_str()));
        assert_eq!(attachment.content_type().media_type(), "application/octet-stream");
        assert_eq!(attachment.read_content().unwrap(), b"file body");
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(Attachment::from_file(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Attachment::from_file("/definitely/not/here.bin"),
            Err(Error::Io(_))
        ));
    }
}
