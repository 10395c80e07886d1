//! Tests for shader compilation and device resource creation.
//!

#![cfg(windows)]

use overlay_core::{Size, Transform};
use overlay_renderer::{DeviceResources, ShaderBytecode};

#[test]
fn compile_shaders() {
    let shaders = ShaderBytecode::compile().unwrap();

    assert!(!shaders.vertex.is_empty());
    assert!(!shaders.pixel.is_empty());
}

#[test]
fn create_resources() {
    let shaders = ShaderBytecode::compile().unwrap();
    let resources = DeviceResources::new(&shaders, Size::new(1920, 1080)).unwrap();

    resources
        .write_transform(Transform {
            x: 400.0 / 1280.0,
            y: 300.0 / 1024.0,
        })
        .unwrap();
}

#[test]
fn recreate_resources() {
    let shaders = ShaderBytecode::compile().unwrap();

    let first = DeviceResources::new(&shaders, Size::new(200, 200)).unwrap();
    drop(first);

    // Bytecode is reusable across devices.
    let second = DeviceResources::new(&shaders, Size::new(200, 200)).unwrap();
    drop(second);
}
