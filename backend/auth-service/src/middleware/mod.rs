pub mod authenticator;

pub use authenticator::{authenticate_token, AuthContext, BearerToken, RequestAuthenticator};
