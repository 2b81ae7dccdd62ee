mod drafts;
mod gallery;
pub mod generator;
mod poller;
mod throttle;

pub use drafts::*;
pub use gallery::*;
pub use poller::*;
pub use throttle::*;
