use crate::panel::function_path;
use crate::panel::notifications::Notification;
use crate::panel::redacted::RedactedString;
use crate::panel::result_error::error::Error;
use crate::panel::result_error::result::Result;
use crate::panel::result_error::{WithDebugObjectAndFnName, WithMsg};
use bon::Builder;
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use validator::Validate;

/// Configuration for mailing run outcomes to the operator.
///
/// The password is held in a `RedactedString` so it cannot leak through
/// logs, debug output or serialized settings.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct SmtpNotificationConfig {
    #[builder(into)]
    host: String,
    #[builder(into)]
    smtp_mode: SmtpMode,
    #[builder(into)]
    from: Mailbox,
    #[validate(length(min = 1))]
    #[builder(into)]
    to: Vec<Mailbox>,
    #[builder(into)]
    username: String,
    #[builder(into)]
    password: RedactedString,
}

/// SMTP connection security modes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SmtpMode {
    Unsecured,
    Ssl,
    StartTls,
}

impl Notification for SmtpNotificationConfig {
    #[named]
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        tracing::info!(
            "Sending run notification from {:?} to {:?}",
            self.from,
            self.to
        );
        let email = self
            .to
            .iter()
            .fold(Message::builder(), |email, send_to| {
                email.to(send_to.clone())
            })
            .from(self.from.clone())
            .subject(format!("{}", topic))
            .header(ContentType::TEXT_PLAIN)
            .body(format!("{}", msg))
            .map_err(Error::from)
            .with_msg(format!(
                "Fail to build notification email from {:?} to {:?}",
                self.from, self.to
            ))
            .with_debug_object_and_fn_name(self.clone(), function_path!())?;

        let creds = Credentials::new(self.username.clone(), self.password.inner().to_string());

        let mailer = match self.smtp_mode {
            SmtpMode::Unsecured => Ok(SmtpTransport::builder_dangerous(self.host.as_str())),
            SmtpMode::Ssl => SmtpTransport::relay(self.host.as_str()),
            SmtpMode::StartTls => SmtpTransport::starttls_relay(self.host.as_str()),
        }
        .map_err(Error::from)
        .with_msg(format!(
            "Failed to build smtp client for host: {:?} with mode {:?}",
            self.host, self.smtp_mode
        ))?
        .credentials(creds)
        .build();

        let response = mailer
            .send(&email)
            .map_err(Error::from)
            .with_debug_object_and_fn_name(self.clone(), function_path!())?;
        if response.is_positive() {
            Ok(())
        } else {
            let error_vec = response
                .message()
                .map(|m| Error::smtp_rejected(m.to_owned()))
                .collect_vec();
            Err(Error::from(error_vec))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    fn test_smtp_notification_send() {
        use std::env;

        // Skip if running in CI or without network
        if env::var("CI").is_ok() {
            return;
        }

        let server = maik::MockServer::builder().no_verify_credentials().build();

        let config = SmtpNotificationConfig::builder()
            .host(format!("{}:{}", server.host(), server.port()))
            .smtp_mode(SmtpMode::Unsecured)
            .from("panel@example.com".parse::<Mailbox>().unwrap())
            .to(vec!["operator@example.com".parse::<Mailbox>().unwrap()])
            .username("paneluser")
            .password(RedactedString::from("panelpass"))
            .build();

        server.start();
        std::thread::sleep(std::time::Duration::from_millis(100));

        let result = config.send("Backup finished", "Ad-hoc daily run completed");

        std::thread::sleep(std::time::Duration::from_millis(200));

        if result.is_ok() {
            let assertion = maik::MailAssertion::new()
                .recipients_are(["operator@example.com"])
                .body_is("Ad-hoc daily run completed");
            assert!(server.assert(assertion));
        }
    }

    #[test]
    fn test_smtp_notification_validation() {
        let valid_config = SmtpNotificationConfig::builder()
            .host("smtp.example.com")
            .smtp_mode(SmtpMode::Ssl)
            .from("panel@example.com".parse::<Mailbox>().unwrap())
            .to(vec!["operator@example.com".parse::<Mailbox>().unwrap()])
            .username("paneluser")
            .password(RedactedString::from("panelpass"))
            .build();

        assert!(valid_config.validate().is_ok());

        let invalid_config = SmtpNotificationConfig::builder()
            .host("smtp.example.com")
            .smtp_mode(SmtpMode::Ssl)
            .from("panel@example.com".parse::<Mailbox>().unwrap())
            .to(vec![])
            .username("paneluser")
            .password(RedactedString::from("panelpass"))
            .build();

        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let config = SmtpNotificationConfig::builder()
            .host("smtp.example.com")
            .smtp_mode(SmtpMode::Ssl)
            .from("panel@example.com".parse::<Mailbox>().unwrap())
            .to(vec!["operator@example.com".parse::<Mailbox>().unwrap()])
            .username("paneluser")
            .password(RedactedString::from("panelpass"))
            .build();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("panelpass"));
    }
}
