pub mod auth;

pub use auth::{change_password, login, logout, me, register};
