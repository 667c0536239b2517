mod email;

pub use email::{DispatchFailure, Dispatcher, ListEmail, SmtpDispatcher};
