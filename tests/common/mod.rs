#![allow(dead_code)]

pub mod fake_runtime;
pub mod harness;
