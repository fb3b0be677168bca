#![forbid(unsafe_code)]

mod articles;
mod lifecycle;
mod listing;
mod sharing;

pub use articles::*;
pub use lifecycle::*;
pub use listing::*;
pub use sharing::*;
