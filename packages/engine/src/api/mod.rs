//! Embedding facades. Only the wasm32 surface exists today; native hosts
//! use the `Engine` type directly.

pub mod wasm;
