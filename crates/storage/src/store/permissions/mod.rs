#![forbid(unsafe_code)]

mod defaults;
mod grants;
mod resolve;
