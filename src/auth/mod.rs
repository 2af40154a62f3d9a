pub mod error;
pub mod gate;
pub mod handlers;

pub use error::AuthError;
pub use gate::{
    Authenticator, SESSION_COOKIE, SessionAuthenticator, TokenAuthenticator, bearer_token,
    get_cookie_value,
};
