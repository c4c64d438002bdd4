pub mod aws;
pub mod callback;
pub mod crawler;
pub mod object_store;
pub mod publisher;
pub mod support;
