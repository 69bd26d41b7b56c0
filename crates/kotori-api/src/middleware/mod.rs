//! Request middleware.

pub mod authorize;
