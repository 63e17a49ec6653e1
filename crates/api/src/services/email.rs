//! Email service for sign-in codes, order confirmations and contact relay.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. When no
//! SMTP configuration is present the service runs in log-only mode and
//! writes each message to the log instead of sending it, so local
//! development works without a mail account.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::Order;

/// HTML template for the sign-in code email.
#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for the sign-in code email.
#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeEmailText<'a> {
    code: &'a str,
}

/// One order line as rendered in the confirmation email.
struct OrderLineView {
    name: String,
    quantity: i32,
    price: String,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationEmailHtml<'a> {
    order_number: &'a str,
    items: &'a [OrderLineView],
    subtotal: String,
    shipping: String,
    total: String,
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationEmailText<'a> {
    order_number: &'a str,
    items: &'a [OrderLineView],
    subtotal: String,
    shipping: String,
    total: String,
}

/// HTML template for the relayed contact form message.
#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactMessageEmailHtml<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Plain text template for the relayed contact form message.
#[derive(Template)]
#[template(path = "email/contact_message.txt")]
struct ContactMessageEmailText<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub enum EmailService {
    /// Deliver over SMTP.
    Smtp {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        from_address: String,
        contact_inbox: String,
    },
    /// Log messages instead of sending them.
    LogOnly,
}

impl EmailService {
    /// Create an email service from configuration; absent configuration
    /// yields the log-only service.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: Option<&EmailConfig>) -> Result<Self, SmtpError> {
        let Some(config) = config else {
            tracing::warn!("no SMTP configuration, emails will be logged instead of sent");
            return Ok(Self::LogOnly);
        };

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self::Smtp {
            mailer,
            from_address: config.from_address.clone(),
            contact_inbox: config.contact_inbox.clone(),
        })
    }

    /// Send a sign-in verification code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_otp_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = OtpCodeEmailHtml { code }.render()?;
        let text = OtpCodeEmailText { code }.render()?;

        self.send_multipart_email(to, None, "Your Meridian Verification Code", &text, &html)
            .await
    }

    /// Send an order confirmation to the shipping email address.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order: &Order,
    ) -> Result<(), EmailError> {
        let items: Vec<OrderLineView> = order
            .items
            .iter()
            .map(|line| OrderLineView {
                name: line
                    .product
                    .as_ref()
                    .map_or_else(|| "Unavailable product".to_owned(), |p| p.name.clone()),
                quantity: line.quantity,
                price: line.price.to_string(),
            })
            .collect();

        let html = OrderConfirmationEmailHtml {
            order_number: &order.order_number,
            items: &items,
            subtotal: order.subtotal.to_string(),
            shipping: order.shipping.to_string(),
            total: order.total.to_string(),
        }
        .render()?;
        let text = OrderConfirmationEmailText {
            order_number: &order.order_number,
            items: &items,
            subtotal: order.subtotal.to_string(),
            shipping: order.shipping.to_string(),
            total: order.total.to_string(),
        }
        .render()?;

        let subject = format!("Order Confirmation - {}", order.order_number);
        self.send_multipart_email(to, None, &subject, &text, &html)
            .await
    }

    /// Relay a contact form submission to the customer service inbox, with
    /// reply-to set to the customer so replies go straight back to them.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_contact_message(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let html = ContactMessageEmailHtml {
            name,
            email,
            subject,
            message,
        }
        .render()?;
        let text = ContactMessageEmailText {
            name,
            email,
            subject,
            message,
        }
        .render()?;

        let inbox = match self {
            Self::Smtp { contact_inbox, .. } => contact_inbox.clone(),
            Self::LogOnly => "(contact inbox)".to_owned(),
        };
        let full_subject = format!("Meridian Contact Form: {subject}");
        self.send_multipart_email(&inbox, Some(email), &full_subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        reply_to: Option<&str>,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let (mailer, from_address) = match self {
            Self::Smtp {
                mailer,
                from_address,
                ..
            } => (mailer, from_address),
            Self::LogOnly => {
                tracing::info!(to = %to, subject = %subject, body = %text_body, "email (log-only mode)");
                return Ok(());
            }
        };

        let mut builder = Message::builder()
            .from(
                format!("Meridian <{from_address}>")
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject);
        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(
                reply_to
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(reply_to.to_string()))?,
            );
        }

        let email = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_string()),
                ),
        )?;

        mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
