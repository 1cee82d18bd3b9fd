pub mod http;
pub mod model;
pub mod service;

pub use model::{SignupPayload, UpdateUserPayload, User};
pub use service::*;
