pub mod api;
pub mod backends;
pub mod translators;
