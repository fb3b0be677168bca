#![forbid(unsafe_code)]

mod invite;
mod manage;
