//! Platform independent 2D canvas layer.
//!
//! A [`canvas::Canvas`] owns a framebuffer and its open/close/resize
//! lifecycle; platform specifics are supplied through
//! [`platform::PlatformCanvas`]. A [`graph2d::Graphics2D`] driver wraps a
//! canvas and draws into it. [`opengl`] provides an OpenGL canvas that
//! negotiates a pixel format and a driver over a [`opengl::GlBackend`], and
//! [`pen`] holds immediate mode drawing helpers with draw call batching.

pub mod canvas;
pub mod clip;
pub mod config;
mod error;
pub mod events;
pub mod font;
pub mod graph2d;
pub mod opengl;
pub mod pen;
pub mod platform;
pub mod registry;
pub mod surface;
pub mod util;
pub mod viewport;

pub use canvas3_types as types;
pub use error::*;
