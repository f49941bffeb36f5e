//! Email service for contact form delivery and admin notifications.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{config::Config, db::models::bookings::BookingDBResponse, errors::Error};

/// Gateway callback fields that are safe to forward to the admin inbox.
///
/// Everything else (card data, cardholder fields) is dropped.
const PAYMENT_SAFE_KEYS: &[&str] = &[
    "oid",
    "OrderId",
    "TransId",
    "transId",
    "Response",
    "ProcReturnCode",
    "mdStatus",
    "ErrMsg",
    "errmsg",
    "ErrorMsg",
    "msg",
    "AuthCode",
    "HostRefNum",
    "clientid",
    "amount",
    "currency",
    "rnd",
    "hash",
    "HASH",
    "HASHPARAMS",
    "HASHPARAMSVAL",
    "HASHALG",
];

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    admin_to: String,
    site_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            crate::config::EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                // Use SMTP transport
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            crate::config::EmailTransportConfig::File { path } => {
                // Use file transport for development/testing
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                let file_transport = AsyncFileTransport::<Tokio1Executor>::new(emails_dir);
                EmailTransport::File(file_transport)
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            admin_to: email_config.admin_recipient().to_string(),
            site_name: email_config.site_name.clone(),
        })
    }

    /// Forward a contact form submission to the admin inbox.
    ///
    /// The visitor's address goes into Reply-To so the admin can answer
    /// directly from their mail client.
    pub async fn send_contact_email(
        &self,
        first_name: &str,
        last_name: &str,
        reply_to: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<(), Error> {
        let email_subject = match subject {
            Some(s) if !s.is_empty() => format!("[{} Contact] {s}", self.site_name),
            _ => format!("[{} Contact] Message from {first_name} {last_name}", self.site_name),
        };

        let body = self.create_contact_body(first_name, last_name, reply_to, subject, message);

        self.send_email(&self.admin_to, Some(reply_to), &email_subject, &body, ContentType::TEXT_HTML)
            .await
    }

    /// Notify the admin about a gateway callback.
    ///
    /// Errors are logged and swallowed: a broken mail setup must never break
    /// the guest's redirect back to the site.
    pub async fn notify_payment(&self, kind: &str, payload: &BTreeMap<String, String>, redirect_target: Option<&str>) {
        let debug = payment_debug_fields(payload);
        let oid = debug.get("oid").or_else(|| debug.get("OrderId")).cloned().unwrap_or_default();

        let subject = if oid.is_empty() {
            format!("[{}] Payment {kind}", self.site_name)
        } else {
            format!("[{}] Payment {kind} (oid: {oid})", self.site_name)
        };
        let body = create_payment_notification_body(kind, &debug, redirect_target);

        if let Err(e) = self
            .send_email(&self.admin_to, None, &subject, &body, ContentType::TEXT_PLAIN)
            .await
        {
            tracing::warn!("payment notification email failed for oid '{oid}': {e}");
        }
    }

    /// Notify the admin about a booking created through a channel webhook.
    pub async fn send_booking_notification(&self, booking: &BookingDBResponse, channel_reference: Option<&str>) -> Result<(), Error> {
        let subject = format!("[{}] New booking for {}", self.site_name, booking.villa_slug);
        let body = create_booking_notification_body(booking, channel_reference);

        self.send_email(&self.admin_to, None, &subject, &body, ContentType::TEXT_PLAIN).await
    }

    async fn send_email(
        &self,
        to_email: &str,
        reply_to: Option<&str>,
        subject: &str,
        body: &str,
        content_type: ContentType,
    ) -> Result<(), Error> {
        // Create from mailbox
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        // Create to mailbox
        let to = to_email.parse::<Mailbox>().map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        // Build message
        let mut builder = Message::builder().from(from).to(to).subject(subject).header(content_type);

        if let Some(reply_to) = reply_to {
            let reply_to = reply_to.parse::<Mailbox>().map_err(|e| Error::Internal {
                operation: format!("parse reply-to email: {e}"),
            })?;
            builder = builder.reply_to(reply_to);
        }

        let message = builder.body(body.to_string()).map_err(|e| Error::Internal {
            operation: format!("build email message: {e}"),
        })?;

        // Send based on transport type
        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }

    fn create_contact_body(&self, first_name: &str, last_name: &str, email: &str, subject: Option<&str>, message: &str) -> String {
        let subject_line = match subject {
            Some(s) if !s.is_empty() => s,
            _ => "Not specified",
        };
        let message_html = message.replace('\n', "<br>");
        let sent_at = chrono::Utc::now().to_rfc2822();
        let site_name = &self.site_name;

        format!(
            r#"<h2>New message from the contact form</h2>
<p><strong>Name:</strong> {first_name} {last_name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Subject:</strong> {subject_line}</p>
<hr>
<h3>Message:</h3>
<p>{message_html}</p>
<hr>
<p><em>This message was sent from the contact form on the {site_name} website.</em></p>
<p><em>Date: {sent_at}</em></p>
"#
        )
    }
}

/// Keep only the callback fields worth forwarding, dropping empty values.
fn payment_debug_fields(payload: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    PAYMENT_SAFE_KEYS
        .iter()
        .filter_map(|&key| {
            payload
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}

fn create_payment_notification_body(kind: &str, debug: &BTreeMap<String, String>, redirect_target: Option<&str>) -> String {
    let mut text = format!("Payment callback received ({kind})\n");
    text.push_str(&format!("Time: {}\n", chrono::Utc::now().to_rfc3339()));
    if let Some(target) = redirect_target {
        text.push_str(&format!("Redirect: {target}\n"));
    }
    if let Some(proc) = debug.get("ProcReturnCode") {
        text.push_str(&format!("ProcReturnCode: {proc}\n"));
    }
    if let Some(md) = debug.get("mdStatus") {
        text.push_str(&format!("mdStatus: {md}\n"));
    }

    let fields = serde_json::to_string_pretty(debug).unwrap_or_else(|_| "{}".to_string());
    text.push_str(&format!("\nSafe fields:\n{fields}\n"));
    text
}

fn create_booking_notification_body(booking: &BookingDBResponse, channel_reference: Option<&str>) -> String {
    let mut text = format!("New booking for {}\n\n", booking.villa_slug);
    text.push_str(&format!("Guest: {} <{}>\n", booking.name, booking.email));
    if let Some(phone) = &booking.phone {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    text.push_str(&format!(
        "Stay: {} to {}\n",
        booking.check_in.format("%Y-%m-%d"),
        booking.check_out.format("%Y-%m-%d")
    ));
    text.push_str(&format!("Guests: {}\n", booking.guests));
    text.push_str(&format!("Amount: {}\n", booking.amount));
    text.push_str(&format!("Source: {}\n", booking.source));
    if let Some(reference) = channel_reference {
        text.push_str(&format!("Channel reference: {reference}\n"));
    }
    text
}
