// src/ipc/mod.rs - Process coordination between editor launches

pub mod frame;
pub mod instance;

pub use instance::{InstanceState, SingleInstance, ENDPOINT_NAME};
