//! Storefront domain, persistence and services shared by the HTTP server and
//! the operator CLI.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

mod uuids;
