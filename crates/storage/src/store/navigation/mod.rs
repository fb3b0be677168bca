#![forbid(unsafe_code)]

mod hierarchy;
mod search;
mod sidebar;
