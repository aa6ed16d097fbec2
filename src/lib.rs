//! Frameshell — the shell layer of an embedded device.
//!
//! Manages a set of full-screen frames (one per running application),
//! decides which one is visible and receives input, and provides an
//! overview carousel for switching, split-screen pairing, and
//! keyboard/gesture navigation. Content rendering belongs to an embedding
//! host behind the `Renderer` trait; this crate is the state machine.

pub mod app;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
