mod action;
mod backend;
mod character;
mod error;
mod event;
mod photo;
mod prompt;
mod profile;
mod tag;
mod task;
mod tier;
mod translator;
mod voice;

pub use action::*;
pub use backend::*;
pub use character::*;
pub use error::*;
pub use event::*;
pub use photo::*;
pub use prompt::*;
pub use profile::*;
pub use tag::*;
pub use task::*;
pub use tier::*;
pub use translator::*;
pub use voice::*;
