//! RFC 5322 rendering of a [`MailMessage`].

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{debug, warn};

use crate::address::{MailAddress, MailAddressCollection};
use crate::attachment::Attachment;
use crate::charset::Encoding;
use crate::encoding::{encode_base64_wrapped, encode_quoted_printable, encode_rfc2047};
use crate::error::{Error, Result};
use crate::message::{MailMessage, MailPriority, TransferEncoding};
use crate::params::quote_value;

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

impl MailMessage {
    /// Renders the message as RFC 5322 bytes.
    ///
    /// Attachment streams are read to the end. Bcc recipients are not
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the message has no `From`
    /// address and [`Error::Io`] if an attachment cannot be read.
    pub fn render(mut self) -> Result<Vec<u8>> {
        let from = self
            .from
            .as_ref()
            .ok_or_else(|| Error::argument("Message has no From address"))?;
        let header_encoding = self.headers_encoding.unwrap_or(Encoding::UTF8);

        let mut out = Vec::new();
        write!(out, "From: {}\r\n", format_address(from, header_encoding))?;
        if let Some(sender) = &self.sender {
            write!(out, "Sender: {}\r\n", format_address(sender, header_encoding))?;
        }
        write_address_list(&mut out, "To", &self.to, header_encoding)?;
        write_address_list(&mut out, "Cc", &self.cc, header_encoding)?;
        write_address_list(&mut out, "Reply-To", &self.reply_to_list, header_encoding)?;

        let subject_encoding = self.subject_encoding.unwrap_or(Encoding::UTF8);
        write!(out, "Subject: {}\r\n", encode_rfc2047(&self.subject, &subject_encoding))?;

        match self.priority {
            MailPriority::High => out.extend_from_slice(b"X-Priority: 1\r\nImportance: high\r\n"),
            MailPriority::Low => out.extend_from_slice(b"X-Priority: 5\r\nImportance: low\r\n"),
            MailPriority::Normal => {}
        }

        if self.headers.get("Date").is_none() {
            write!(out, "Date: {}\r\n", Utc::now().to_rfc2822())?;
        }
        for (name, value) in self.headers.iter() {
            write!(out, "{name}: {}\r\n", encode_rfc2047(value, &header_encoding))?;
        }
        out.extend_from_slice(b"MIME-Version: 1.0\r\n");

        let attachments = std::mem::take(&mut self.attachments);
        if attachments.is_empty() {
            write_body(&mut out, &self)?;
        } else {
            let boundary = next_boundary();
            write!(
                out,
                "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
            )?;
            out.extend_from_slice(b"This is a multi-part message in MIME format.\r\n");

            write!(out, "\r\n--{boundary}\r\n")?;
            write_body(&mut out, &self)?;

            let count = attachments.len();
            for mut attachment in attachments {
                write!(out, "\r\n--{boundary}\r\n")?;
                write_attachment(&mut out, &mut attachment, header_encoding)?;
            }
            write!(out, "\r\n--{boundary}--\r\n")?;
            debug!(attachments = count, "Rendered multipart message");
        }

        debug!(bytes = out.len(), "Rendered message");
        Ok(out)
    }
}

fn next_boundary() -> String {
    let n = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    let stamp = Utc::now().timestamp_micros();
    format!("--boundary_{n}_{stamp:x}")
}

fn format_address(address: &MailAddress, fallback: Encoding) -> String {
    let name = address.display_name();
    if name.is_empty() {
        return address.address().to_string();
    }
    let encoding = address.display_name_encoding().copied().unwrap_or(fallback);
    let encoded = encode_rfc2047(name, &encoding);
    if encoded == name {
        format!("{} <{}>", quote_value(name), address.address())
    } else {
        format!("{encoded} <{}>", address.address())
    }
}

fn write_address_list(
    out: &mut Vec<u8>,
    header: &str,
    addresses: &MailAddressCollection,
    fallback: Encoding,
) -> Result<()> {
    if addresses.is_empty() {
        return Ok(());
    }
    let list: Vec<String> = addresses
        .iter()
        .map(|address| format_address(address, fallback))
        .collect();
    write!(out, "{header}: {}\r\n", list.join(", "))?;
    Ok(())
}

/// Normalizes bare LF line breaks to CRLF.
fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn write_body(out: &mut Vec<u8>, message: &MailMessage) -> Result<()> {
    let encoding = message.body_encoding.unwrap_or(Encoding::UTF8);
    let media_type = if message.is_body_html {
        "text/html"
    } else {
        "text/plain"
    };
    let bytes = encoding.encode(&to_crlf(&message.body)).into_owned();

    let transfer_encoding = match message.body_transfer_encoding {
        TransferEncoding::Unknown if bytes.is_ascii() => TransferEncoding::SevenBit,
        TransferEncoding::Unknown => TransferEncoding::QuotedPrintable,
        other => other,
    };

    write!(out, "Content-Type: {media_type}; charset={}\r\n", encoding.name())?;
    write!(out, "Content-Transfer-Encoding: {transfer_encoding}\r\n\r\n")?;
    write_encoded(out, &bytes, transfer_encoding);
    Ok(())
}

fn write_attachment(
    out: &mut Vec<u8>,
    attachment: &mut Attachment,
    header_encoding: Encoding,
) -> Result<()> {
    let content = attachment.read_content()?;

    let mut content_type = attachment.content_type().clone();
    if let Some(charset) = content_type.charset()
        && Encoding::for_label(charset).is_err()
    {
        warn!(charset, "Attachment declares an unknown charset");
    }

    let name_encoding = attachment
        .name_encoding()
        .copied()
        .unwrap_or(header_encoding);
    let name = attachment
        .name()
        .map(|name| encode_rfc2047(name, &name_encoding));
    if content_type.name().is_none() {
        content_type.set_name(name.as_deref());
    }

    let transfer_encoding = match attachment.transfer_encoding() {
        TransferEncoding::Unknown => TransferEncoding::Base64,
        other => other,
    };

    let mut disposition = attachment.content_disposition().clone();
    if disposition.file_name().is_none() {
        disposition.set_file_name(name);
    }

    write!(out, "Content-Type: {content_type}\r\n")?;
    write!(out, "Content-Transfer-Encoding: {transfer_encoding}\r\n")?;
    if let Some(content_id) = attachment.content_id() {
        write!(out, "Content-ID: <{content_id}>\r\n")?;
    }
    write!(out, "Content-Disposition: {disposition}\r\n\r\n")?;
    write_encoded(out, &content, transfer_encoding);
    Ok(())
}

fn write_encoded(out: &mut Vec<u8>, bytes: &[u8], transfer_encoding: TransferEncoding) {
    match transfer_encoding {
        TransferEncoding::Base64 => out.extend_from_slice(encode_base64_wrapped(bytes).as_bytes()),
        TransferEncoding::QuotedPrintable => {
            out.extend_from_slice(encode_quoted_printable(bytes).as_bytes());
        }
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Unknown => {
            out.extend_from_slice(bytes);
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
    use crate::content_type::ContentType;

    fn render_text(message: MailMessage) -> String {
        String::from_utf8(message.render().unwrap()).unwrap()
    }

    #[test]
    fn test_render_simple() {
        let message =
            MailMessage::with_content("a@a.com", "b@b.com, c@c.com", "Hello", "Hi there").unwrap();
        let text = render_text(message);

        assert!(text.starts_with("From: a@a.com\r\n"));
        assert!(text.contains("To: b@b.com, c@c.com\r\n"));
        assert!(text.contains("Subject: Hello\r\n"));
        assert!(text.contains("MIME-Version: 1.0\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(text.contains("Content-Transfer-Encoding: 7bit\r\n"));
        assert!(text.ends_with("\r\n\r\nHi there"));
    }

    #[test]
    fn test_render_requires_from() {
        let message = MailMessage::new();
        assert!(matches!(message.render(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_render_skips_bcc() {
        let mut message = MailMessage::from_text("a@a.com", "b@b.com").unwrap();
        message.bcc.add_list("hidden@x.com").unwrap();
        let text = render_text(message);
        assert!(!text.contains("hidden@x.com"));
    }

    #[test]
    fn test_render_encoded_subject_and_names() {
        let mut message = MailMessage::from_text("a@a.com", "b@b.com").unwrap();
        message.subject = "Grüße".to_string();
        message.subject_encoding = Some(Encoding::LATIN1);
        message.from = Some(MailAddress::with_display_name("a@a.com", "José").unwrap());
        let text = render_text(message);

        assert!(text.contains("Subject: =?iso-8859-1?B?"));
        assert!(text.contains("From: =?utf-8?B?"));
    }

    #[test]
    fn test_render_non_ascii_body_uses_quoted_printable() {
        let mut message = MailMessage::with_content("a@a.com", "b@b.com", "s", "café").unwrap();
        message.is_body_html = true;
        let text = render_text(message);
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(text.contains("Content-Transfer-Encoding: quoted-printable\r\n"));
        assert!(text.contains("caf=C3=A9"));
    }

    #[test]
    fn test_render_priority() {
        let mut message = MailMessage::from_text("a@a.com", "b@b.com").unwrap();
        message.priority = MailPriority::High;
        assert!(render_text(message).contains("X-Priority: 1\r\n"));
    }

    #[test]
    fn test_render_attachment() {
        let mut message = MailMessage::with_content("a@a.com", "b@b.com", "s", "body").unwrap();
        let mut attachment =
            Attachment::from_bytes(b"Hello, World!".to_vec(), ContentType::new());
        attachment.set_name(Some("hello.bin".to_string()));
        attachment.set_content_id(Some("part1".to_string()));
        message.attachments.push(attachment);
        message.headers.add("X-Mailer", "serialmail");

        let text = render_text(message);
        assert!(text.contains("Content-Type: multipart/mixed; boundary="));
        assert!(text.contains("X-Mailer: serialmail\r\n"));
        assert!(text.contains("Content-Type: application/octet-stream; name=hello.bin\r\n"));
        assert!(text.contains("Content-Transfer-Encoding: base64\r\n"));
        assert!(text.contains("Content-ID: <part1>\r\n"));
        assert!(text.contains("Content-Disposition: attachment; filename=hello.bin\r\n"));
        assert!(text.contains("SGVsbG8sIFdvcmxkIQ=="));
    }
}
