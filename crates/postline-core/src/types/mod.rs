//! Core domain types for collections, requests, history, and mock endpoints.

pub mod collection;
pub mod endpoint;
pub mod history;
pub mod request;
