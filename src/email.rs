//! Password reset mail using lettre

use anyhow::Context;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};

use crate::config::EmailConfig;

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from: Mailbox,
    frontend_url: String,
    skip_sending: bool,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let mut builder = if config.smtp_tls {
            SmtpTransport::relay(&config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(config.smtp_port)
        } else {
            // Plain connection for local catchers such as MailDev
            SmtpTransport::builder_dangerous(&config.smtp_host).port(config.smtp_port)
        };

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.to_owned(),
                config.smtp_password.to_owned(),
            ));
        }

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .context("Failed to parse from email")?;

        info!(
            smtp_host = %config.smtp_host,
            smtp_port = config.smtp_port,
            tls = config.smtp_tls,
            skip_sending = config.skip_sending,
            "Email service initialized"
        );

        Ok(Self {
            mailer: builder.build(),
            from,
            frontend_url: config.frontend_url.trim_end_matches('/').to_owned(),
            skip_sending: config.skip_sending,
        })
    }

    /// Frontend page the user lands on to choose a new password.
    pub fn reset_link(&self, token: &str, email: &str) -> anyhow::Result<String> {
        let mut url = url::Url::parse(&format!("{}/reset-password/{token}", self.frontend_url))
            .context("Failed to build reset link")?;
        url.query_pairs_mut().append_pair("email", email);

        Ok(url.to_string())
    }

    /// Sends the reset link. Delivery failures are logged, never returned,
    /// so the response does not reveal whether the address exists.
    pub async fn send_password_reset(&self, to_email: &str, token: &str) -> anyhow::Result<()> {
        let reset_link = self.reset_link(token, to_email)?;

        if self.skip_sending {
            info!(to = to_email, %reset_link, "Skipping password reset email");
            return Ok(());
        }

        let plain_body = format!(
            "You are receiving this email because we received a password reset request for your account.\n\n\
             Reset Password: {reset_link}\n\n\
             This password reset link will expire in 60 minutes.\n\n\
             If you did not request a password reset, no further action is required.\n"
        );
        let html_body = format!(
            "<p>You are receiving this email because we received a password reset request for your account.</p>\
             <p><a href=\"{reset_link}\">Reset Password</a></p>\
             <p>This password reset link will expire in 60 minutes.</p>\
             <p>If you did not request a password reset, no further action is required.</p>"
        );

        let to: Mailbox = to_email.parse().context("Failed to parse to email")?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Reset Password Notification")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .context("Failed to build email message")?;

        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email)).await?;

        match result {
            Ok(_) => info!(to = to_email, "Password reset email sent"),
            Err(e) => warn!(error = %e, to = to_email, "Failed to send password reset email"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            frontend_url: "http://localhost:5173/".to_string(),
            skip_sending: true,
            ..EmailConfig::default()
        }
    }

    #[test]
    fn test_reset_link_encodes_email() {
        let service = EmailService::new(&config()).unwrap();
        let link = service.reset_link("abc123", "john+1@example.com").unwrap();

        assert_eq!(
            link,
            "http://localhost:5173/reset-password/abc123?email=john%2B1%40example.com"
        );
    }

    #[tokio::test]
    async fn test_skip_sending() {
        let service = EmailService::new(&config()).unwrap();

        service
            .send_password_reset("john@example.com", "abc123")
            .await
            .unwrap();
    }
}
