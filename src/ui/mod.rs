// ABOUTME: Thin presentation layer for the terminal REPL
// The core never depends on this module; it renders and collects input only

pub mod chat;

pub use chat::Command;
