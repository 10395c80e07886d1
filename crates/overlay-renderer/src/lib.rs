//! # Overlay Renderer
//! Draws the captured region into a click-through window using Direct3D 11 and DirectComposition.
//!

#![cfg(windows)]

mod compositor;
mod renderer;
mod resources;
mod shader;

pub use compositor::Compositor;
pub use renderer::{Error, Renderer};
pub use resources::{DeviceResources, TransformBuffer};
pub use shader::{Error as ShaderError, ShaderBytecode};
