mod mailer;

pub use mailer::{MailError, Mailer, MailerBuilder, SendReceipt, SendRequest};
