//! Graph analyses run once at freeze time.
pub mod topology;
