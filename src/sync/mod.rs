mod services;

#[cfg(test)]
pub(crate) use services::fakes;
pub use services::ProductSync;
