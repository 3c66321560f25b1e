#![allow(dead_code)]

pub mod link_test;
pub mod recorder;

pub use link_test::{LinkTest, default_test_config, random_words};
pub use recorder::Recorder;
