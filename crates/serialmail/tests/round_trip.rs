//! Round-trip tests between live messages, records and JSON.

#![allow(clippy::unwrap_used, clippy::unreadable_literal)]

use std::io::Cursor;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serialmail::{
    AddressCollection, AddressRecord, AttachmentCollection, AttachmentRecord, ConvertConfig,
    Converter, EncodingIntrospection, Error, MessageRecord, NoIntrospection, to_live, to_record,
};
use serialmail_mime::{
    Attachment, ContentType, DeliveryNotificationOptions, Encoding, MailAddress, MailMessage,
    MailPriority, Outbox, TransferEncoding, Transport,
};

fn thirty_three_bytes() -> Vec<u8> {
    (0u8..33).collect()
}

fn full_message() -> MailMessage {
    let mut message = MailMessage::new();
    message.from = Some(MailAddress::with_encoding("ok@ok.com", "Yes", Encoding::ASCII).unwrap());
    message.sender = Some(MailAddress::new("\"Desk\" <desk@example.com>").unwrap());
    message.to.add_list("a@a.com, \"Bee\" <b@b.com>").unwrap();
    message.cc.add_list("c@c.com").unwrap();
    message.bcc.add_list("hidden@example.com").unwrap();
    message.reply_to_list.add_list("reply@example.com").unwrap();
    message.subject = "Quarterly numbers".into();
    message.subject_encoding = Some(Encoding::UTF8);
    message.body = "<p>See attached.</p>".into();
    message.body_encoding = Some(Encoding::LATIN1);
    message.is_body_html = true;
    message.body_transfer_encoding = TransferEncoding::QuotedPrintable;
    message.priority = MailPriority::High;
    message.delivery_notification_options =
        DeliveryNotificationOptions::ON_FAILURE | DeliveryNotificationOptions::DELAY;
    message.headers.set("X-Campaign", "spring");
    message.headers.set("X-Mailer", "serialmail");
    message.headers_encoding = Some(Encoding::LATIN1);

    let mut content_type = ContentType::with_media_type("application/pdf").unwrap();
    content_type.set_name(Some("report.pdf"));
    let mut attachment = Attachment::from_bytes(thirty_three_bytes(), content_type);
    attachment.set_content_id(Some("report-1".into()));
    attachment.set_name_encoding(Some(Encoding::UTF8));
    let disposition = attachment.content_disposition_mut();
    disposition.set_file_name(Some("report.pdf".into()));
    disposition.set_size(33);
    disposition.set_creation_date(Some(Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap()));
    disposition.parameters_mut().set("x-origin", "scanner");
    message.attachments.push(attachment);

    message.attachments.push(Attachment::from_string("plain notes", Some("notes.txt")).unwrap());
    message
}

#[test]
fn test_full_message_round_trip() {
    let mut live = full_message();
    let record = to_record(&mut live).unwrap();
    let mut back = to_live(&record).unwrap();

    assert_eq!(back.from.as_ref().unwrap().address(), "ok@ok.com");
    assert_eq!(back.sender.as_ref().unwrap().display_name(), "Desk");
    assert_eq!(back.to.len(), 2);
    assert_eq!(back.to.get(1).unwrap().display_name(), "Bee");
    assert_eq!(back.cc.get(0).unwrap().address(), "c@c.com");
    assert_eq!(back.bcc.get(0).unwrap().address(), "hidden@example.com");
    assert_eq!(back.reply_to_list.get(0).unwrap().address(), "reply@example.com");
    assert_eq!(back.subject, "Quarterly numbers");
    assert_eq!(back.subject_encoding, Some(Encoding::UTF8));
    assert_eq!(back.body, "<p>See attached.</p>");
    assert_eq!(back.body_encoding, Some(Encoding::LATIN1));
    assert_eq!(back.headers_encoding, Some(Encoding::LATIN1));
    assert!(back.is_body_html);
    assert_eq!(back.body_transfer_encoding, TransferEncoding::QuotedPrintable);
    assert_eq!(back.priority, MailPriority::High);
    assert!(
        back.delivery_notification_options
            .contains(DeliveryNotificationOptions::DELAY)
    );
    assert_eq!(back.headers.get("x-campaign").as_deref(), Some("spring"));

    let first = &mut back.attachments[0];
    assert_eq!(first.name(), Some("report.pdf"));
    assert_eq!(first.content_id(), Some("report-1"));
    assert_eq!(first.name_encoding(), Some(&Encoding::UTF8));
    assert_eq!(first.content_type().media_type(), "application/pdf");
    assert_eq!(first.content_disposition().size(), 33);
    assert_eq!(
        first.content_disposition().parameters().get("x-origin"),
        Some("scanner")
    );
    assert_eq!(first.read_content().unwrap(), thirty_three_bytes());

    let second = &mut back.attachments[1];
    assert_eq!(second.name(), Some("notes.txt"));
    assert_eq!(second.read_content().unwrap(), b"plain notes");

    let again = to_record(&mut to_live(&record).unwrap()).unwrap();
    assert_eq!(again, record);
}

#[test]
fn test_record_survives_json() {
    let mut live = full_message();
    let record = to_record(&mut live).unwrap();

    let json = record.to_json_pretty().unwrap();
    let parsed = MessageRecord::from_json(&json).unwrap();
    assert_eq!(parsed, record);
    assert_eq!(parsed.from.as_ref().unwrap().display_name_code_page, 20127);
    assert_eq!(parsed.headers_code_page, Some(28591));
    let first = parsed.attachments.get(0).unwrap();
    assert_eq!(first.content_bytes, thirty_three_bytes());
    assert_eq!(first.name_encoding_code_page, Some(65001));
    assert!(parsed.attachments.get(1).unwrap().name_encoding_code_page.is_none());

    let mut back = to_live(&parsed).unwrap();
    assert_eq!(back.headers_encoding.as_ref().map(Encoding::code_page), Some(28591));
    assert_eq!(back.attachments[0].name_encoding().map(Encoding::code_page), Some(65001));
    assert!(back.attachments[1].name_encoding().is_none());
    assert_eq!(back.attachments[0].read_content().unwrap(), thirty_three_bytes());
}

#[test]
fn test_out_of_range_disposition_date_is_rejected() {
    let mut live = full_message();
    let record = to_record(&mut live).unwrap();
    let json = record
        .to_json()
        .unwrap()
        .replace("2021-03-04T05:06:07Z", "+10000-01-01T00:00:00Z");
    assert!(json.contains("+10000-01-01T00:00:00Z"));

    let parsed = MessageRecord::from_json(&json).unwrap();
    let disposition = &parsed.attachments.get(0).unwrap().content_disposition;
    assert_eq!(disposition.to_string(), "attachment");
    assert!(matches!(to_live(&parsed), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_default_code_page() {
    let record = AddressRecord::new("ok@ok.com", None, None).unwrap();
    assert_eq!(record.display_name_code_page, 65001);
    assert_eq!(AddressRecord::default().display_name_code_page, 65001);
}

#[test]
fn test_ascii_display_name_code_page_survives() {
    let converter = Converter::new(ConvertConfig::default());
    let record = AddressRecord::new("ok@ok.com", Some("Yes"), Some(Encoding::ASCII)).unwrap();
    assert_eq!(record.display_name_code_page, 20127);

    let live = converter.address_to_live(Some(&record)).unwrap().unwrap();
    assert_eq!(live.address(), "ok@ok.com");
    assert_eq!(live.display_name(), "Yes");
    assert_eq!(live.display_name_encoding().map(Encoding::code_page), Some(20127));

    let again = converter.address_to_record(Some(&live)).unwrap();
    assert_eq!(again.display_name_code_page, 20127);
}

#[test]
fn test_null_propagation() {
    let converter = Converter::with_code_pages(ConvertConfig::default(), EncodingIntrospection);
    assert!(converter.address_to_record(None).is_none());
    assert!(converter.address_to_live(None).unwrap().is_none());

    let record = to_record(&mut MailMessage::new()).unwrap();
    assert!(record.from.is_none());
    assert!(record.sender.is_none());
    let back = to_live(&record).unwrap();
    assert!(back.from.is_none());
    assert!(back.sender.is_none());
}

#[test]
fn test_fallback_code_page_without_introspection() {
    let config = ConvertConfig::builder()
        .default_display_name_code_page(1252)
        .build();
    let converter = Converter::with_code_pages(config, NoIntrospection);
    let live = MailAddress::with_encoding("ok@ok.com", "Yes", Encoding::ASCII).unwrap();

    let record = converter.address_to_record(Some(&live)).unwrap();
    assert_eq!(record.display_name_code_page, 1252);

    let back = converter.address_to_live(Some(&record)).unwrap().unwrap();
    assert_eq!(back.display_name_encoding().map(Encoding::code_page), Some(1252));
}

#[test]
fn test_thirty_three_byte_attachment() {
    let record = AttachmentRecord::from_reader(
        Cursor::new(thirty_three_bytes()),
        Some("blob.bin"),
        None,
    )
    .unwrap();
    assert_eq!(record.content_bytes.len(), 33);

    let converter = Converter::new(ConvertConfig::default());
    let mut live = converter.attachment_to_live(&record).unwrap();
    assert_eq!(live.name(), Some("blob.bin"));
    assert_eq!(live.read_content().unwrap(), thirty_three_bytes());

    // The record keeps its own copy.
    assert_eq!(record.content_bytes, thirty_three_bytes());
}

#[test]
fn test_append_keeps_order() {
    let mut addresses = AddressCollection::new();
    addresses.append("a@a.com, b@b.com").unwrap();
    let listed: Vec<&str> = addresses.iter().map(|a| a.address.as_str()).collect();
    assert_eq!(listed, ["a@a.com", "b@b.com"]);
}

#[test]
fn test_disposed_collection_rejects_mutation() {
    let mut attachments = AttachmentCollection::new();
    attachments
        .push(AttachmentRecord::from_string("x", Some("x.txt")).unwrap())
        .unwrap();
    attachments.dispose();
    assert!(attachments.is_disposed());
    assert!(attachments.is_empty());

    let record = AttachmentRecord::from_string("y", None).unwrap();
    assert!(matches!(
        attachments.insert(0, record.clone()),
        Err(Error::ObjectDisposed(_))
    ));
    assert!(matches!(attachments.push(record), Err(Error::ObjectDisposed(_))));
    assert!(matches!(attachments.clear(), Err(Error::ObjectDisposed(_))));
    assert!(matches!(
        attachments.insert(0, None),
        Err(Error::InvalidArgument(_))
    ));

    attachments.dispose();
    assert!(attachments.is_disposed());
}

#[test]
fn test_none_attachment_rejected() {
    let mut attachments = AttachmentCollection::new();
    assert!(matches!(attachments.push(None), Err(Error::InvalidArgument(_))));
    assert!(matches!(
        attachments.insert(0, None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(attachments.is_empty());
}

#[test]
fn test_rebuilt_message_renders_and_sends() {
    let mut live = full_message();
    let record = to_record(&mut live).unwrap();
    let back = to_live(&record).unwrap();

    let mut outbox = Outbox::new();
    outbox.send(back).unwrap();
    let text = String::from_utf8_lossy(&outbox.messages()[0]).into_owned();
    assert!(text.contains("Subject: Quarterly numbers\r\n"));
    assert!(text.contains("multipart/mixed"));
    assert!(!text.contains("hidden@example.com"));
}

fn address_parts() -> impl Strategy<Value = (String, String, String)> {
    ("[a-z]{1,10}", "[a-z]{1,8}\\.com", "[A-Za-z]{0,12}")
}

proptest! {
    #[test]
    fn prop_address_round_trip((user, host, name) in address_parts()) {
        let converter = Converter::new(ConvertConfig::default());
        let text = format!("{user}@{host}");
        let live = MailAddress::with_encoding(&text, &name, Encoding::UTF8).unwrap();

        let record = converter.address_to_record(Some(&live)).unwrap();
        let back = converter.address_to_live(Some(&record)).unwrap().unwrap();
        prop_assert_eq!(back.address(), text.as_str());
        prop_assert_eq!(back.display_name(), name.as_str());
        prop_assert_eq!(record.user(), user.as_str());
        prop_assert_eq!(record.host(), host.as_str());
    }

    #[test]
    fn prop_headers_round_trip(
        headers in prop::collection::btree_map("X-[a-z]{1,8}", "[A-Za-z0-9]{0,20}", 0..6)
    ) {
        let mut live = MailMessage::with_content("a@a.com", "b@b.com", "s", "b").unwrap();
        for (name, value) in &headers {
            live.headers.set(name.as_str(), value.as_str());
        }

        let record = to_record(&mut live).unwrap();
        let json = record.to_json().unwrap();
        let back = to_live(&MessageRecord::from_json(&json).unwrap()).unwrap();

        prop_assert_eq!(back.headers.len(), headers.len());
        for (name, value) in &headers {
            prop_assert_eq!(back.headers.get(name), Some(value.clone()));
        }
    }
}
