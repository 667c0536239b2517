use std::fmt::{Debug, Display};

use crate::{config::Config, notification::ListEmail};

/// Sender password, only ever kept in memory and never shown
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    pub password: Secret,
}

impl Credentials {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: Secret(password.into()),
        }
    }

    /// Both an address and a password have been given
    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.password.expose().is_empty()
    }
}

/// Everything the conversation has collected so far
#[derive(Debug, Default)]
pub struct Session {
    /// Address typed before the password has been entered
    pending_address: Option<String>,
    credentials: Option<Credentials>,
    /// Recipients exactly as typed, used when asking for confirmation
    recipients_raw: String,
    recipients: Vec<String>,
    items: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Default::default()
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// True once a non-empty address and password are known
    pub fn has_credentials(&self) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(Credentials::is_complete)
    }

    pub fn recipients_raw(&self) -> &str {
        &self.recipients_raw
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn set_sender_address(&mut self, address: String) {
        self.pending_address = Some(address);
    }

    /// Completes the credentials using the address entered before
    pub fn set_sender_password(&mut self, password: String) {
        let address = self.pending_address.take().unwrap_or_default();
        self.credentials = Some(Credentials {
            address,
            password: password.into(),
        });
    }

    /// Starts a fresh list for the given recipients
    pub fn set_recipients(&mut self, raw: String, recipients: Vec<String>) {
        self.recipients_raw = raw;
        self.recipients = recipients;
        self.items.clear();
    }

    pub fn extend_items(&mut self, items: Vec<String>, config: &Config) {
        if config.skip_blank_items {
            self.items
                .extend(items.into_iter().filter(|item| !item.is_empty()));
        } else {
            self.items.extend(items);
        }
    }

    /// Forgets recipients and items but keeps who is sending
    pub fn reset_list(&mut self) {
        self.recipients_raw.clear();
        self.recipients.clear();
        self.items.clear();
    }

    /// Forgets everything including credentials
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Builds the message for the current list if credentials are known
    pub fn compose(&self, config: &Config) -> Option<ListEmail> {
        let credentials = self.credentials.as_ref()?;
        Some(ListEmail::new(
            credentials.address.clone(),
            self.recipients.clone(),
            config.subject.clone(),
            &config.body_heading,
            &self.items,
        ))
    }
}

/// Counts of what happened during a session
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SessionReport {
    pub lists_sent: usize,
    pub dispatch_failures: usize,
}

impl Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} list(s) sent, {} failed",
            self.lists_sent, self.dispatch_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_session() -> Session {
        let mut session = Session::new();
        session.set_sender_address("me@gmail.com".to_string());
        session.set_sender_password("hunter2".to_string());
        session.set_recipients("a@x.com".to_string(), vec!["a@x.com".to_string()]);
        session.extend_items(vec!["milk".to_string()], &Config::default());
        session
    }

    #[test]
    fn password_not_in_debug_output() {
        let session = filled_session();

        let debug = format!("{session:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("me@gmail.com"));
        assert_eq!(
            session.credentials().unwrap().password.expose(),
            "hunter2"
        );
    }

    #[test]
    fn reset_list_keeps_credentials() {
        let mut session = filled_session();

        session.reset_list();

        assert_eq!(
            session.credentials(),
            Some(&Credentials::new("me@gmail.com", "hunter2"))
        );
        assert!(session.recipients().is_empty());
        assert!(session.recipients_raw().is_empty());
        assert!(session.items().is_empty());
    }

    #[test]
    fn reset_all_forgets_credentials() {
        let mut session = filled_session();

        session.reset_all();

        assert!(session.credentials().is_none());
        assert!(session.items().is_empty());
    }

    #[test]
    fn blank_items_kept_unless_configured() {
        let items = vec!["a".to_string(), String::new(), "b".to_string()];
        let mut keep = Session::new();
        let mut skip = Session::new();
        let skip_config = Config {
            skip_blank_items: true,
            ..Default::default()
        };

        keep.extend_items(items.clone(), &Config::default());
        skip.extend_items(items, &skip_config);

        assert_eq!(keep.items(), ["a", "", "b"]);
        assert_eq!(skip.items(), ["a", "b"]);
    }

    #[test]
    fn blank_address_or_password_is_incomplete() {
        let mut blank_password = Session::new();
        blank_password.set_sender_address("me@gmail.com".to_string());
        blank_password.set_sender_password(String::new());

        let blank_address = Session::with_credentials(Credentials::new("", "hunter2"));

        assert!(!blank_password.has_credentials());
        assert!(!blank_address.has_credentials());
        assert!(filled_session().has_credentials());
    }

    #[test]
    fn compose_needs_credentials() {
        assert!(Session::new().compose(&Config::default()).is_none());
        assert!(filled_session().compose(&Config::default()).is_some());
    }
}
