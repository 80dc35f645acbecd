//! Email notification service.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    Address,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use serde::Serialize;
use url::Url;

use onboard_common::{AppError, AppResult, config::EmailSettings};
use onboard_db::entities::account_request;

/// Email message to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient display name
    pub to_name: Option<String>,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body
    pub html_body: String,
}

/// Email delivery result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliveryResult {
    /// Whether the email was accepted by the relay
    pub success: bool,
    /// Relay response or error text
    pub detail: Option<String>,
}

#[derive(Clone)]
struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    sender: Option<SmtpSender>,
    instance_name: String,
    instance_url: Url,
}

impl EmailService {
    /// Create a new email service. `None` settings disable sending.
    pub fn new(
        settings: Option<&EmailSettings>,
        instance_name: String,
        instance_url: Url,
    ) -> AppResult<Self> {
        let sender = settings.map(build_sender).transpose()?;

        Ok(Self {
            sender,
            instance_name,
            instance_url: as_base(instance_url),
        })
    }

    /// Create a service that renders but never sends.
    #[must_use]
    pub fn disabled(instance_name: String, instance_url: Url) -> Self {
        Self {
            sender: None,
            instance_name,
            instance_url: as_base(instance_url),
        }
    }

    /// Check if email service is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Send an email.
    pub async fn send(&self, message: EmailMessage) -> AppResult<EmailDeliveryResult> {
        let Some(sender) = &self.sender else {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                "Email disabled, skipping send"
            );
            return Ok(EmailDeliveryResult {
                success: false,
                detail: Some("email disabled".to_string()),
            });
        };

        let to = recipient(&message)?;

        let email = Message::builder()
            .from(sender.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body,
            ))
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        let response = sender
            .transport
            .send(email)
            .await
            .map_err(|e| AppError::ExternalService(format!("SMTP send failed: {e}")))?;

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");

        Ok(EmailDeliveryResult {
            success: response.is_positive(),
            detail: Some(response.message().collect::<Vec<_>>().join(" ")),
        })
    }

    /// Link the requester follows to confirm an approved request.
    pub fn confirmation_url(&self, identity_token: &str) -> AppResult<Url> {
        let mut url = self
            .instance_url
            .join("account-requests/confirm")
            .map_err(|e| AppError::Config(format!("Invalid server url: {e}")))?;
        url.query_pairs_mut().append_pair("token", identity_token);
        Ok(url)
    }

    /// Render the approval mail sent to the requester.
    #[must_use]
    pub fn render_approval_request(
        &self,
        request: &account_request::Model,
        confirmation_url: &Url,
    ) -> EmailMessage {
        let subject = format!(
            "Your {} account request was approved",
            self.instance_name
        );
        let text = format!(
            "Hi {},\n\n\
            Your request to set up {} on {} was approved.\n\n\
            Finish setting up your organization here:\n{}\n",
            request.name, request.organization_name, self.instance_name, confirmation_url
        );
        let html = self.wrap_html(&format!(
            "<p>Hi {},</p>\
            <p>Your request to set up <strong>{}</strong> on {} was approved.</p>\
            <p><a href=\"{}\" style=\"display:inline-block;padding:12px 24px;background:#28a745;color:#fff;text-decoration:none;border-radius:4px;\">Set up your organization</a></p>",
            escape_html(&request.name),
            escape_html(&request.organization_name),
            escape_html(&self.instance_name),
            escape_html(confirmation_url.as_str()),
        ));

        EmailMessage {
            to: request.email.clone(),
            to_name: Some(request.name.clone()),
            subject,
            text_body: text,
            html_body: html,
        }
    }

    /// Render the rejection mail sent to the requester.
    #[must_use]
    pub fn render_rejection(&self, request: &account_request::Model, reason: &str) -> EmailMessage {
        let subject = format!("Your {} account request", self.instance_name);
        let text = format!(
            "Hi {},\n\n\
            We were unable to approve your request to set up {} on {}.\n\n\
            Reason: {}\n",
            request.name, request.organization_name, self.instance_name, reason
        );
        let html = self.wrap_html(&format!(
            "<p>Hi {},</p>\
            <p>We were unable to approve your request to set up <strong>{}</strong> on {}.</p>\
            <blockquote>{}</blockquote>",
            escape_html(&request.name),
            escape_html(&request.organization_name),
            escape_html(&self.instance_name),
            escape_html(reason),
        ));

        EmailMessage {
            to: request.email.clone(),
            to_name: Some(request.name.clone()),
            subject,
            text_body: text,
            html_body: html,
        }
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #007bff; }}
        blockquote {{ margin: 10px 0; padding: 10px 20px; border-left: 4px solid #e9ecef; background: #f8f9fa; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        This email was sent from <a href="{}">{}</a>.
    </p>
</body>
</html>"#,
            content,
            escape_html(self.instance_url.as_str()),
            escape_html(&self.instance_name)
        )
    }
}

fn build_sender(settings: &EmailSettings) -> AppResult<SmtpSender> {
    let builder = if settings.smtp_tls {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
    }
    .map_err(|e| AppError::Config(format!("Invalid SMTP host: {e}")))?
    .port(settings.port());

    let builder = match (&settings.smtp_username, &settings.smtp_password) {
        (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
        _ => builder,
    };

    let from_address: Address = settings
        .from_address
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?;
    let from = Mailbox::new(Some(settings.from_name.clone()), from_address);

    Ok(SmtpSender {
        transport: builder.build(),
        from,
    })
}

/// Display names are free text; only the address itself is parsed.
fn recipient(message: &EmailMessage) -> AppResult<Mailbox> {
    let address: Address = message
        .to
        .parse()
        .map_err(|e| AppError::Validation(format!("Invalid recipient address: {e}")))?;

    Ok(Mailbox::new(message.to_name.clone(), address))
}

/// Make `url` usable as a join base, so a path prefix like `/onboard` is kept.
fn as_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use onboard_db::entities::account_request::AccountRequestStatus;

    fn service() -> EmailService {
        EmailService::disabled(
            "Onboard".to_string(),
            Url::parse("https://onboard.example.com/").unwrap(),
        )
    }

    fn request() -> account_request::Model {
        account_request::Model {
            id: "req1".to_string(),
            name: "Ada <Admin>".to_string(),
            email: "ada@example.com".to_string(),
            organization_name: "Engines & Co".to_string(),
            organization_website: None,
            request_details: "x".repeat(60),
            status: AccountRequestStatus::Pending,
            confirmed_at: None,
            rejection_reason: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_confirmation_url_encodes_token() {
        let url = service().confirmation_url("a.b+c").unwrap();

        assert_eq!(
            url.as_str(),
            "https://onboard.example.com/account-requests/confirm?token=a.b%2Bc"
        );
    }

    #[test]
    fn test_render_approval_request() {
        let svc = service();
        let url = svc.confirmation_url("tok").unwrap();
        let message = svc.render_approval_request(&request(), &url);

        assert_eq!(message.to, "ada@example.com");
        assert_eq!(message.subject, "Your Onboard account request was approved");
        assert!(message.text_body.contains(url.as_str()));
        assert!(message.html_body.contains("Ada &lt;Admin&gt;"));
        assert!(message.html_body.contains("Engines &amp; Co"));
    }

    #[test]
    fn test_render_rejection_includes_reason() {
        let message = service().render_rejection(&request(), "too vague");

        assert!(message.text_body.contains("Reason: too vague"));
        assert!(message.html_body.contains("<blockquote>too vague</blockquote>"));
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let svc = service();
        assert!(!svc.is_enabled());

        let result = svc.send(svc.render_rejection(&request(), "no")).await.unwrap();
        assert!(!result.success);
    }

    #[test]
    fn test_confirmation_url_keeps_path_prefix() {
        let svc = EmailService::disabled(
            "Onboard".to_string(),
            Url::parse("https://example.com/onboard").unwrap(),
        );

        assert_eq!(
            svc.confirmation_url("tok").unwrap().as_str(),
            "https://example.com/onboard/account-requests/confirm?token=tok"
        );
    }

    #[test]
    fn test_recipient_accepts_free_text_names() {
        for name in ["Lovelace, Ada", "Ada (admin)", "O'Brien; Ada", "\"Ada\" <x>"] {
            let mut message = service().render_rejection(&request(), "no");
            message.to_name = Some(name.to_string());

            let mailbox = recipient(&message).unwrap();
            assert_eq!(mailbox.name.as_deref(), Some(name));
            assert_eq!(mailbox.email.to_string(), "ada@example.com");
        }
    }

    #[test]
    fn test_recipient_rejects_bad_address() {
        let mut message = service().render_rejection(&request(), "no");
        message.to = "not an address".to_string();

        assert!(matches!(recipient(&message), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_enabled_service_sends_to_names_with_commas() {
        let settings = EmailSettings {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: Some(1),
            smtp_tls: false,
            smtp_username: None,
            smtp_password: None,
            from_address: "noreply@example.com".to_string(),
            from_name: "Onboard".to_string(),
        };
        let svc = EmailService::new(
            Some(&settings),
            "Onboard".to_string(),
            Url::parse("https://onboard.example.com/").unwrap(),
        )
        .unwrap();
        assert!(svc.is_enabled());

        let mut rejected = request();
        rejected.name = "Lovelace, Ada".to_string();

        // Nothing listens on port 1, so the message must get as far as the relay.
        let err = svc
            .send(svc.render_rejection(&rejected, "no"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)), "got {err:?}");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
