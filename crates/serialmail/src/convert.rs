//! Conversion between live messages and records.

use serialmail_mime::{
    Attachment, ContentDisposition, ContentType, Encoding, HeaderCollection, MailAddress,
    MailAddressCollection, MailMessage,
};
use tracing::{debug, trace};

use crate::codepage::{DisplayNameCodePage, EncodingIntrospection};
use crate::config::ConvertConfig;
use crate::error::Result;
use crate::record::{
    AddressCollection, AddressRecord, AttachmentCollection, AttachmentRecord,
    ContentDispositionRecord, ContentTypeRecord, MessageRecord, StringMap,
};

/// Converts live mail objects into records and back.
///
/// Holds the conversion settings and the capability used to recover
/// display name encodings. Every conversion is a stateless mapping.
#[derive(Debug, Clone)]
pub struct Converter<C = EncodingIntrospection> {
    config: ConvertConfig,
    code_pages: C,
}

impl Converter {
    /// Creates a converter reading encodings from live addresses.
    #[must_use]
    pub const fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            code_pages: EncodingIntrospection,
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl<C: DisplayNameCodePage> Converter<C> {
    /// Creates a converter with a custom encoding recovery capability.
    pub const fn with_code_pages(config: ConvertConfig, code_pages: C) -> Self {
        Self { config, code_pages }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Converts a live address. `None` stays `None`.
    #[must_use]
    pub fn address_to_record(&self, address: Option<&MailAddress>) -> Option<AddressRecord> {
        address.map(|address| {
            AddressRecord::from_live(
                address,
                &self.code_pages,
                self.config.default_display_name_code_page,
            )
        })
    }

    /// Rebuilds a live address. `None` stays `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEncoding`] if the code page is not
    /// available and [`crate::Error::InvalidArgument`] or
    /// [`crate::Error::InvalidFormat`] for a bad address.
    pub fn address_to_live(&self, record: Option<&AddressRecord>) -> Result<Option<MailAddress>> {
        let Some(record) = record else {
            return Ok(None);
        };
        let encoding = Encoding::from_code_page(record.display_name_code_page)?;
        let address = MailAddress::with_encoding(&record.address, &record.display_name, encoding)?;
        Ok(Some(address))
    }

    /// Converts a live address list, keeping order.
    #[must_use]
    pub fn addresses_to_record(&self, addresses: &MailAddressCollection) -> AddressCollection {
        addresses
            .iter()
            .filter_map(|address| self.address_to_record(Some(address)))
            .collect()
    }

    /// Rebuilds a live address list, keeping order.
    ///
    /// # Errors
    ///
    /// Fails on the first record [`Converter::address_to_live`] rejects.
    pub fn addresses_to_live(&self, records: &AddressCollection) -> Result<MailAddressCollection> {
        let mut addresses = MailAddressCollection::new();
        for record in records {
            if let Some(address) = self.address_to_live(Some(record))? {
                addresses.push(address);
            }
        }
        Ok(addresses)
    }

    /// Converts a live content type.
    #[must_use]
    pub fn content_type_to_record(&self, content_type: &ContentType) -> ContentTypeRecord {
        ContentTypeRecord::from_live(content_type)
    }

    /// Rebuilds a live content type, defaulting to
    /// `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFormat`] for a malformed media type.
    pub fn content_type_to_live(&self, record: &ContentTypeRecord) -> Result<ContentType> {
        record.to_live()
    }

    /// Converts a live content disposition.
    #[must_use]
    pub fn disposition_to_record(
        &self,
        disposition: &ContentDisposition,
    ) -> ContentDispositionRecord {
        ContentDispositionRecord::from_live(disposition)
    }

    /// Writes a disposition record into an existing live disposition,
    /// parameters key by key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFormat`] for a malformed disposition
    /// type.
    pub fn disposition_into_live(
        &self,
        record: &ContentDispositionRecord,
        disposition: &mut ContentDisposition,
    ) -> Result<()> {
        record.copy_into(disposition)
    }

    /// Captures a live attachment, reading its stream to the end.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the stream fails.
    pub fn attachment_to_record(&self, attachment: &mut Attachment) -> Result<AttachmentRecord> {
        AttachmentRecord::from_live(attachment)
    }

    /// Rebuilds a live attachment over a copy of the captured bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEncoding`] for an unavailable name
    /// code page and [`crate::Error::InvalidFormat`] for malformed content
    /// metadata.
    pub fn attachment_to_live(&self, record: &AttachmentRecord) -> Result<Attachment> {
        record.to_live()
    }

    /// Captures every live attachment, keeping order.
    ///
    /// # Errors
    ///
    /// Fails on the first attachment that cannot be read.
    pub fn attachments_to_record(
        &self,
        attachments: &mut [Attachment],
    ) -> Result<AttachmentCollection> {
        let records = attachments
            .iter_mut()
            .map(|attachment| self.attachment_to_record(attachment))
            .collect::<Result<AttachmentCollection>>()?;
        let bytes: usize = records.iter().map(|r| r.content_bytes.len()).sum();
        debug!(attachments = records.len(), bytes, "Captured attachments");
        Ok(records)
    }

    /// Rebuilds live attachments, keeping order.
    ///
    /// # Errors
    ///
    /// Fails on the first record [`Converter::attachment_to_live`] rejects.
    pub fn attachments_to_live(&self, records: &AttachmentCollection) -> Result<Vec<Attachment>> {
        records
            .iter()
            .map(|record| self.attachment_to_live(record))
            .collect()
    }

    /// Copies live headers; multi-valued headers are joined with `,`.
    #[must_use]
    pub fn headers_to_record(&self, headers: &HeaderCollection) -> StringMap {
        StringMap::from_headers(headers)
    }

    /// Converts a whole live message.
    ///
    /// Attachment streams are consumed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if an attachment cannot be read.
    pub fn message_to_record(&self, message: &mut MailMessage) -> Result<MessageRecord> {
        let mut record = MessageRecord::new();
        record.from = self.address_to_record(message.from.as_ref());
        record.sender = self.address_to_record(message.sender.as_ref());
        record.to = self.addresses_to_record(&message.to);
        record.cc = self.addresses_to_record(&message.cc);
        record.bcc = self.addresses_to_record(&message.bcc);
        record.reply_to_list = self.addresses_to_record(&message.reply_to_list);
        record.set_subject(Some(&message.subject));
        record.subject_code_page = message.subject_encoding.map(|e| e.code_page());
        record.set_body(Some(&message.body));
        record.body_code_page = message.body_encoding.map(|e| e.code_page());
        record.headers_code_page = message.headers_encoding.map(|e| e.code_page());
        record.is_body_html = message.is_body_html;
        record.body_transfer_encoding = message.body_transfer_encoding;
        record.priority = message.priority;
        record.delivery_notification_options = message.delivery_notification_options;
        record.headers = self.headers_to_record(&message.headers);
        record.attachments = self.attachments_to_record(&mut message.attachments)?;

        trace!(
            to = record.to.len(),
            cc = record.cc.len(),
            bcc = record.bcc.len(),
            headers = record.headers.len(),
            "Converted message to record"
        );
        Ok(record)
    }

    /// Rebuilds a live message from a record.
    ///
    /// Absent code pages leave the live encoding unset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEncoding`] for an unavailable code
    /// page and [`crate::Error::InvalidFormat`] or
    /// [`crate::Error::InvalidArgument`] for bad addresses or content
    /// metadata.
    pub fn message_to_live(&self, record: &MessageRecord) -> Result<MailMessage> {
        let mut message = MailMessage::new();
        message.from = self.address_to_live(record.from.as_ref())?;
        message.body = record.body().to_string();
        message.subject = record.subject().to_string();
        message.is_body_html = record.is_body_html;
        message.delivery_notification_options = record.delivery_notification_options;
        message.body_transfer_encoding = record.body_transfer_encoding;
        message.priority = record.priority;
        message.sender = self.address_to_live(record.sender.as_ref())?;

        if let Some(code_page) = record.body_code_page {
            message.body_encoding = Some(Encoding::from_code_page(code_page)?);
        }
        if let Some(code_page) = record.subject_code_page {
            message.subject_encoding = Some(Encoding::from_code_page(code_page)?);
        }
        if let Some(code_page) = record.headers_code_page {
            message.headers_encoding = Some(Encoding::from_code_page(code_page)?);
        }

        record.headers.copy_into_headers(&mut message.headers);
        message.attachments = self.attachments_to_live(&record.attachments)?;
        message.to = self.addresses_to_live(&record.to)?;
        message.cc = self.addresses_to_live(&record.cc)?;
        message.bcc = self.addresses_to_live(&record.bcc)?;
        message.reply_to_list = self.addresses_to_live(&record.reply_to_list)?;

        debug!(
            attachments = message.attachments.len(),
            recipients = message.to.len() + message.cc.len() + message.bcc.len(),
            "Rebuilt live message"
        );
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
    use crate::codepage::NoIntrospection;
    use crate::error::Error;

    fn converter() -> Converter {
        Converter::default()
    }

    #[test]
    fn test_address_null_propagation() {
        let converter = converter();
        assert!(converter.address_to_record(None).is_none());
        assert!(converter.address_to_live(None).unwrap().is_none());
    }

    #[test]
    fn test_address_ascii_round_trip() {
        let converter = converter();
        let live = MailAddress::with_encoding("ok@ok.com", "Yes", Encoding::ASCII).unwrap();

        let record = converter.address_to_record(Some(&live)).unwrap();
        assert_eq!(record.address, "ok@ok.com");
        assert_eq!(record.display_name, "Yes");
        assert_eq!(record.display_name_code_page, 20127);

        let back = converter.address_to_live(Some(&record)).unwrap().unwrap();
        assert_eq!(EncodingIntrospection.display_name_code_page(&back), Some(20127));
    }

    #[test]
    fn test_configured_default_code_page() {
        let config = ConvertConfig::builder()
            .default_display_name_code_page(1252)
            .build();
        let live = MailAddress::with_encoding("ok@ok.com", "Yes", Encoding::ASCII).unwrap();

        let converter = Converter::with_code_pages(config, NoIntrospection);
        let record = converter.address_to_record(Some(&live)).unwrap();
        assert_eq!(record.display_name_code_page, 1252);

        let converter = Converter::new(config);
        let plain = MailAddress::new("a@a.com").unwrap();
        let record = converter.address_to_record(Some(&plain)).unwrap();
        assert_eq!(record.display_name_code_page, 1252);
    }

    #[test]
    fn test_address_to_live_invalid_encoding() {
        let converter = converter();
        let mut record = AddressRecord::parse("a@a.com").unwrap();
        record.display_name_code_page = 12345;
        assert!(matches!(
            converter.address_to_live(Some(&record)),
            Err(Error::InvalidEncoding(12345))
        ));
    }

    #[test]
    fn test_addresses_keep_order() {
        let converter = converter();
        let mut live = MailAddressCollection::new();
        live.add_list("z@z.com, a@a.com, m@m.com").unwrap();

        let records = converter.addresses_to_record(&live);
        let back = converter.addresses_to_live(&records).unwrap();
        let addresses: Vec<&str> = back.iter().map(MailAddress::address).collect();
        assert_eq!(addresses, ["z@z.com", "a@a.com", "m@m.com"]);
    }

    #[test]
    fn test_disposition_into_live_keeps_map() {
        let converter = converter();
        let mut record = ContentDispositionRecord::new();
        record.parameters.insert("x-id", "7");
        record.file_name = Some("f.txt".into());

        let mut live = ContentDisposition::new();
        live.parameters_mut().set("other", "1");
        converter.disposition_into_live(&record, &mut live).unwrap();

        assert_eq!(live.file_name(), Some("f.txt"));
        assert_eq!(live.parameters().len(), 2);
        assert_eq!(converter.disposition_to_record(&live).parameters.len(), 2);
    }

    #[test]
    fn test_message_code_pages_only_when_set() {
        let converter = converter();
        let mut live = MailMessage::with_content("a@a.com", "b@b.com", "s", "b").unwrap();
        live.subject_encoding = Some(Encoding::ASCII);

        let record = converter.message_to_record(&mut live).unwrap();
        assert_eq!(record.subject_code_page, Some(20127));
        assert!(record.body_code_page.is_none());
        assert!(record.headers_code_page.is_none());

        let back = converter.message_to_live(&record).unwrap();
        assert_eq!(back.subject_encoding, Some(Encoding::ASCII));
        assert!(back.body_encoding.is_none());
        assert!(back.headers_encoding.is_none());
    }

    #[test]
    fn test_message_to_live_bad_code_page() {
        let converter = converter();
        let mut record = MessageRecord::from_text("a@a.com", "b@b.com").unwrap();
        record.body_code_page = Some(-5);
        assert!(matches!(
            converter.message_to_live(&record),
            Err(Error::InvalidEncoding(-5))
        ));
    }
}
