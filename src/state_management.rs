use log::{debug, error};

use crate::{
    config::Config,
    console::Console,
    entries::{is_yes, parse_recipients, Entry},
    notification::{DispatchFailure, Dispatcher},
    session::{Session, SessionReport},
};

const APP_PASSWORD_NOTICE: [&str; 2] = [
    "Note: If you have two-step verification enabled, you'll need to generate an application-specific password.",
    "Refer to this link to generate an app-specific password: https://support.google.com/mail/answer/185833?hl=en",
];

/// Where the conversation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitSenderAddress,
    AwaitSenderPassword,
    AwaitRecipients,
    CollectingItems,
    ConfirmSend,
    /// No prompt, the driver sends the list then moves on
    Dispatching,
    AwaitRestart,
    AwaitSameAccount,
    Terminated,
}

impl State {
    /// Where a session begins, skipping the credential prompts if they are already known
    pub fn initial(session: &Session) -> Self {
        if session.has_credentials() {
            Self::AwaitRecipients
        } else {
            Self::AwaitSenderAddress
        }
    }

    /// Lines shown once before the prompt of this state
    pub fn notice(&self) -> &'static [&'static str] {
        match self {
            Self::AwaitSenderPassword => &APP_PASSWORD_NOTICE,
            _ => &[],
        }
    }

    /// Question to ask in this state, `None` for states that take no input
    pub fn prompt(&self, session: &Session) -> Option<String> {
        let result = match self {
            Self::AwaitSenderAddress => {
                "Enter your email address (either gmail.com or a custom Google Workspace account): "
                    .to_string()
            }
            Self::AwaitSenderPassword => {
                "Enter your email password or app-specific password: ".to_string()
            }
            Self::AwaitRecipients => {
                "Enter the email addresses to send the list to (comma-separated): ".to_string()
            }
            Self::CollectingItems => {
                "Enter a value for the list (comma-separated, or 'x' to finish): ".to_string()
            }
            Self::ConfirmSend => format!(
                "Do you want to send the list to {}? (yes/no): ",
                session.recipients_raw()
            ),
            Self::AwaitRestart => "Do you want to create a new list? (yes/no): ".to_string(),
            Self::AwaitSameAccount => {
                "Do you want to send from the same email account? (yes/no): ".to_string()
            }
            Self::Dispatching | Self::Terminated => return None,
        };
        Some(result)
    }

    /// Applies one line of input and returns the next state
    pub fn next(self, session: &mut Session, line: String, config: &Config) -> Self {
        match self {
            Self::AwaitSenderAddress => {
                session.set_sender_address(line);
                Self::AwaitSenderPassword
            }
            Self::AwaitSenderPassword => {
                session.set_sender_password(line);
                if session.has_credentials() {
                    Self::AwaitRecipients
                } else {
                    debug!("Blank address or password, asking again");
                    session.reset_all();
                    Self::AwaitSenderAddress
                }
            }
            Self::AwaitRecipients => {
                let recipients = parse_recipients(&line);
                debug!("{} recipient(s) entered", recipients.len());
                session.set_recipients(line, recipients);
                Self::CollectingItems
            }
            Self::CollectingItems => match Entry::from(line.as_str()) {
                Entry::Finished => Self::ConfirmSend,
                Entry::Items(items) => {
                    session.extend_items(items, config);
                    Self::CollectingItems
                }
            },
            Self::ConfirmSend => {
                if is_yes(&line) {
                    Self::Dispatching
                } else {
                    Self::AwaitRestart
                }
            }
            Self::AwaitRestart => {
                if is_yes(&line) {
                    Self::AwaitSameAccount
                } else {
                    Self::Terminated
                }
            }
            Self::AwaitSameAccount => {
                if is_yes(&line) {
                    session.reset_list();
                    Self::AwaitRecipients
                } else {
                    session.reset_all();
                    Self::AwaitSenderAddress
                }
            }
            // Neither state prompts so there is no input to apply
            Self::Dispatching | Self::Terminated => self,
        }
    }
}

/// Drives the conversation until the user quits or the input is closed
pub struct SessionDriver<'a, C, D> {
    console: C,
    dispatcher: D,
    config: &'a Config,
    session: Session,
    report: SessionReport,
}

impl<'a, C: Console, D: Dispatcher> SessionDriver<'a, C, D> {
    pub fn new(console: C, dispatcher: D, config: &'a Config) -> Self {
        Self::with_session(console, dispatcher, config, Session::new())
    }

    pub fn with_session(console: C, dispatcher: D, config: &'a Config, session: Session) -> Self {
        Self {
            console,
            dispatcher,
            config,
            session,
            report: Default::default(),
        }
    }

    pub fn into_parts(self) -> (C, D, Session) {
        (self.console, self.dispatcher, self.session)
    }

    /// Blocks reading lines until the session is terminated
    pub fn run(&mut self) -> anyhow::Result<SessionReport> {
        let mut state = State::initial(&self.session);
        debug!("Session starting in {state:?}");
        loop {
            let next = match state {
                State::Terminated => break,
                State::Dispatching => self.dispatch()?,
                _ => self.converse(state)?,
            };
            if next != state {
                debug!("Transition {state:?} -> {next:?}");
            }
            state = next;
        }
        debug!("Session ended: {}", self.report);
        Ok(self.report)
    }

    fn converse(&mut self, state: State) -> anyhow::Result<State> {
        for line in state.notice() {
            self.console.say(line)?;
        }
        let Some(question) = state.prompt(&self.session) else {
            return Ok(State::Terminated);
        };
        let Some(line) = self.console.ask(&question)? else {
            debug!("Input closed while in {state:?}");
            return Ok(State::Terminated);
        };
        let next = state.next(&mut self.session, line, self.config);
        if state == State::AwaitRestart && next == State::Terminated {
            self.console.say("Exiting the program.")?;
        }
        Ok(next)
    }

    /// Sends the current list, success or failure both lead to the restart question
    fn dispatch(&mut self) -> anyhow::Result<State> {
        let outcome = match (
            self.session.credentials(),
            self.session.compose(self.config),
        ) {
            (Some(credentials), Some(email)) => self.dispatcher.dispatch(credentials, &email),
            _ => Err(DispatchFailure::MissingCredentials),
        };
        match outcome {
            Ok(response) => {
                self.report.lists_sent += 1;
                self.console.say(&format!("Email sent: {response}"))?;
                self.console.say("The list has been sent.")?;
            }
            Err(e) => {
                self.report.dispatch_failures += 1;
                error!("Failed to send list: {e}");
                self.console.say(&format!("Error: {e}"))?;
            }
        }
        Ok(State::AwaitRestart)
    }
}
