mod dto;
pub mod gateway;
pub mod handlers;
pub mod model;

pub use gateway::{OpenFoodFacts, ProductGateway};
