pub mod auth;
pub mod cookie;
pub mod health;
pub mod login;
pub mod password_reset;
pub mod profile;
pub mod signup;
pub mod token;

pub use auth::AuthenticatedUser;
pub use health::health_check;
pub use login::login;
pub use password_reset::{request_password_reset, reset_password};
pub use profile::{change_password, me, update_profile};
pub use signup::sign_up;
pub use token::{logout, refresh};
