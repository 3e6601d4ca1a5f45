pub mod handlers;
mod services;
pub mod state;

pub use services::Lookups;
