#![forbid(unsafe_code)]

pub mod aggregate;
pub mod broadcast;
pub mod config;
pub mod datamodel;
pub mod dispatch;
pub mod http;
pub mod object_store;
pub mod parsing;
pub mod registry;
pub mod transform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
