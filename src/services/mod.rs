pub mod account;
pub mod cleanup;
pub mod email;
pub mod hasher;
pub mod mail_queue;
pub mod token;
pub mod validator;

pub use account::AccountService;
pub use email::{EmailService, Notifier};
pub use hasher::CredentialHasher;
pub use mail_queue::MailQueue;
pub use token::TokenCodec;
