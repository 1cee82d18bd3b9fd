pub mod products;
pub mod reports;
pub mod users;
