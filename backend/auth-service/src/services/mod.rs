pub mod session;

pub use session::{IssuedSession, SessionService};
