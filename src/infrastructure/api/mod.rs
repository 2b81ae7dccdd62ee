mod catalog;
mod characters;
mod client;

pub use catalog::*;
pub use characters::*;
pub use client::*;
