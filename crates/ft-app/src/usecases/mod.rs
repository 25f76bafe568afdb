//! Use cases that combine the backend auth API with the session container.

pub mod auth;

pub use auth::{SignInWithPassword, SignOutEverywhere, SignUp};
