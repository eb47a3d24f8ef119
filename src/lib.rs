// lib.rs - Library root for the smarttext editor core

pub mod app_dirs;
pub mod cli;
pub mod command;
pub mod config;
pub mod document;
pub mod document_set;
pub mod editor;
pub mod ipc;
pub mod lifecycle;
pub mod paths;
pub mod session;
pub mod settings;
