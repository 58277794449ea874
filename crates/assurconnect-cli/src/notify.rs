use anyhow::Result;
use assurconnect_config::{NotificationBackend, NotificationsConfig};
use assurconnect_core::Lead;

pub trait Notifier {
    fn send(&self, title: &str, body: &str) -> Result<()>;
}

pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&self, title: &str, body: &str) -> Result<()> {
        println!("{title}: {body}");
        Ok(())
    }
}

pub fn build_notifier(config: &NotificationsConfig) -> Result<Option<Box<dyn Notifier>>> {
    if !config.enabled {
        return Ok(None);
    }
    match config.backend {
        NotificationBackend::Stdout => Ok(Some(Box::new(StdoutNotifier))),
        NotificationBackend::Email => build_email_notifier(config),
    }
}

#[cfg(feature = "email-notify")]
fn build_email_notifier(config: &NotificationsConfig) -> Result<Option<Box<dyn Notifier>>> {
    let email = config.email.as_ref().ok_or_else(|| {
        crate::error::invalid_input("notifications.email is required for the email backend")
    })?;
    Ok(Some(Box::new(EmailNotifier::new(email)?)))
}

#[cfg(not(feature = "email-notify"))]
fn build_email_notifier(_config: &NotificationsConfig) -> Result<Option<Box<dyn Notifier>>> {
    Err(crate::error::invalid_input(
        "email notifications require the email-notify feature",
    ))
}

/// Announces a freshly captured lead to whoever handles follow-up.
pub fn notify_new_lead(notifier: &dyn Notifier, lead: &Lead) -> Result<()> {
    let (title, body) = new_lead_message(lead)?;
    notifier.send(&title, &body)
}

fn new_lead_message(lead: &Lead) -> Result<(String, String)> {
    let title = format!("New lead: {}", lead.category.label());
    let body = format!(
        "id {} received {}\n{}",
        lead.id,
        assurconnect_core::time::format_iso_millis(&lead.created_at),
        serde_json::to_string_pretty(&lead.payload)?
    );
    Ok((title, body))
}

#[cfg(feature = "email-notify")]
pub struct EmailNotifier {
    from: lettre::message::Mailbox,
    to: Vec<lettre::message::Mailbox>,
    subject_prefix: String,
    transport: lettre::SmtpTransport,
}

#[cfg(feature = "email-notify")]
impl EmailNotifier {
    pub fn new(config: &assurconnect_config::NotificationsEmailConfig) -> Result<Self> {
        use crate::error::invalid_input;
        use assurconnect_config::EmailTls;
        use lettre::transport::smtp::authentication::Credentials;
        use std::env;
        use std::time::Duration;

        let from = config
            .from
            .parse()
            .map_err(|_| invalid_input("notifications.email.from must be a valid email address"))?;
        let mut to = Vec::with_capacity(config.to.len());
        for raw in &config.to {
            let mailbox = raw.parse().map_err(|_| {
                invalid_input("notifications.email.to must contain valid email addresses")
            })?;
            to.push(mailbox);
        }

        let mut builder = match config.tls {
            EmailTls::Tls => lettre::SmtpTransport::relay(&config.smtp_host)
                .map_err(|_| invalid_input("invalid notifications.email.smtp_host"))?,
            EmailTls::StartTls => lettre::SmtpTransport::starttls_relay(&config.smtp_host)
                .map_err(|_| invalid_input("invalid notifications.email.smtp_host"))?,
            EmailTls::None => lettre::SmtpTransport::builder_dangerous(&config.smtp_host),
        };

        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Some(Duration::from_secs(seconds)));
        }

        if let (Some(username), Some(password_env)) =
            (config.username.as_deref(), config.password_env.as_deref())
        {
            let password = env::var(password_env)
                .map_err(|_| invalid_input(format!("missing env var {password_env}")))?;
            let password = password.trim();
            if password.is_empty() {
                return Err(invalid_input(format!("env var {password_env} is empty")));
            }
            let credentials = Credentials::new(username.to_string(), password.to_string());
            builder = builder.credentials(credentials);
        }

        Ok(Self {
            from,
            to,
            subject_prefix: config.subject_prefix.clone(),
            transport: builder.build(),
        })
    }
}

#[cfg(feature = "email-notify")]
impl Notifier for EmailNotifier {
    fn send(&self, title: &str, body: &str) -> Result<()> {
        use lettre::message::header::ContentType;
        use lettre::Message;
        use lettre::Transport as _;

        let subject = if self.subject_prefix.is_empty() {
            title.to_string()
        } else {
            format!("{} - {}", self.subject_prefix, title)
        };
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for mailbox in &self.to {
            builder = builder.to(mailbox.clone());
        }

        let message = builder.body(body.to_string())?;
        self.transport.send(&message)?;
        Ok(())
    }
}
