//! Cart Handlers

pub(crate) mod add;
pub(crate) mod find;
pub(crate) mod remove;
