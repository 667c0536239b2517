use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::{self, authentication::Credentials as SmtpCredentials},
    Message, SmtpTransport, Transport,
};
use log::{debug, info};
use thiserror::Error;

use crate::{config::Config, session::Credentials};

#[derive(Debug, Error)]
pub enum DispatchFailure {
    #[error("no sender credentials have been entered")]
    MissingCredentials,

    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to build message: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("failed to send via {relay}: {source}")]
    Transport {
        relay: String,
        #[source]
        source: smtp::Error,
    },
}

/// A finished list ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEmail {
    from: String,
    to: Vec<String>,
    subject: String,
    body: String,
}

impl ListEmail {
    pub fn new(
        from: String,
        to: Vec<String>,
        subject: String,
        heading: &str,
        items: &[String],
    ) -> Self {
        let mut body = heading.to_string();
        body.push('\n');
        body.push_str(&items.join("\n"));
        Self {
            from,
            to,
            subject,
            body,
        }
    }

    pub fn sender(&self) -> &str {
        &self.from
    }

    pub fn recipients(&self) -> &[String] {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn to_message(&self) -> Result<Message, DispatchFailure> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }
        Ok(builder.body(self.body.clone())?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchFailure> {
    address
        .parse::<Mailbox>()
        .map_err(|source| DispatchFailure::Address {
            address: address.to_string(),
            source,
        })
}

/// Sends a finished list on behalf of the sender
pub trait Dispatcher {
    /// Returns a description of the server's acceptance on success
    fn dispatch(
        &self,
        credentials: &Credentials,
        email: &ListEmail,
    ) -> Result<String, DispatchFailure>;
}

/// Sends through an authenticated SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpDispatcher {
    relay: String,
    port: Option<u16>,
    starttls: bool,
}

impl SmtpDispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            relay: config.smtp_relay.clone(),
            port: config.smtp_port,
            starttls: config.smtp_starttls,
        }
    }

    fn transport(&self, credentials: &Credentials) -> Result<SmtpTransport, DispatchFailure> {
        let builder = if self.starttls {
            SmtpTransport::starttls_relay(&self.relay)
        } else {
            SmtpTransport::relay(&self.relay)
        };
        let mut builder = builder
            .map_err(|source| self.transport_failure(source))?
            .credentials(SmtpCredentials::new(
                credentials.address.clone(),
                credentials.password.expose().to_string(),
            ));
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        Ok(builder.build())
    }

    fn transport_failure(&self, source: smtp::Error) -> DispatchFailure {
        DispatchFailure::Transport {
            relay: self.relay.clone(),
            source,
        }
    }
}

impl Dispatcher for SmtpDispatcher {
    fn dispatch(
        &self,
        credentials: &Credentials,
        email: &ListEmail,
    ) -> Result<String, DispatchFailure> {
        let message = email.to_message()?;
        debug!(
            "Connecting to {} (port: {:?}, starttls: {})",
            self.relay, self.port, self.starttls
        );
        let response = self
            .transport(credentials)?
            .send(&message)
            .map_err(|source| self.transport_failure(source))?;
        let response = format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        );
        info!(
            "List sent to {} recipient(s) via {}: {response}",
            email.recipients().len(),
            self.relay
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn grocery_email(to: &[&str]) -> ListEmail {
        ListEmail::new(
            "me@gmail.com".to_string(),
            strings(to),
            "Your List".to_string(),
            "Here is your list:",
            &strings(&["milk", "eggs", "bread"]),
        )
    }

    #[test]
    fn body_lists_items_in_order() {
        let email = grocery_email(&["a@x.com"]);
        assert_eq!(email.body(), "Here is your list:\nmilk\neggs\nbread");
    }

    #[test]
    fn body_with_no_items_is_just_the_heading() {
        let email = ListEmail::new(
            "me@gmail.com".to_string(),
            strings(&["a@x.com"]),
            "Your List".to_string(),
            "Here is your list:",
            &[],
        );
        assert_eq!(email.body(), "Here is your list:\n");
    }

    #[test]
    fn message_headers() {
        // Arrange
        let email = grocery_email(&["a@x.com", "b@y.com"]);

        // Act
        let message = email.to_message().unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        // Assert
        assert!(formatted.contains("From: me@gmail.com"));
        assert!(formatted.contains("To: a@x.com, b@y.com"));
        assert!(formatted.contains("Subject: Your List"));
        let milk = formatted.find("milk").unwrap();
        let eggs = formatted.find("eggs").unwrap();
        let bread = formatted.find("bread").unwrap();
        assert!(milk < eggs && eggs < bread);
    }

    #[test]
    fn invalid_recipient_is_reported() {
        let email = grocery_email(&["a@x.com", "not an address"]);

        let actual = email.to_message().unwrap_err();

        match actual {
            DispatchFailure::Address { address, .. } => assert_eq!(address, "not an address"),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn empty_recipient_line_is_reported() {
        let email = grocery_email(&[""]);
        assert!(matches!(
            email.to_message(),
            Err(DispatchFailure::Address { .. })
        ));
    }

    #[test]
    fn dispatcher_uses_config() {
        let config = Config {
            smtp_relay: "mail.example.com".to_string(),
            smtp_port: Some(587),
            smtp_starttls: true,
            ..Default::default()
        };

        let dispatcher = SmtpDispatcher::new(&config);

        assert_eq!(dispatcher.relay, "mail.example.com");
        assert_eq!(dispatcher.port, Some(587));
        assert!(dispatcher.starttls);
    }
}
