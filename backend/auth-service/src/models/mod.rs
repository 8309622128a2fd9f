pub mod principal;

pub use principal::{PrincipalKind, PrincipalRecord};
