pub mod basket;
pub mod list;
