pub mod http;
pub mod model;
pub mod service;

pub use model::{CreateProductPayload, Product, UpdateProductPayload};
pub use service::*;
