use desktop_duplication::{DuplicatedFrame, WinError};
use overlay_core::{CaptureRegion, OverlayRenderer, PresentError, Size, Transform};
use thiserror::Error;
use tracing::{info, instrument};
use utilities::DebugTime;
use windows::Win32::{
    Foundation::HWND,
    Graphics::{
        Direct3D::D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        Direct3D11::{D3D11_BOX, D3D11_VIEWPORT, ID3D11Device},
        Dxgi::{DXGI_ERROR_DEVICE_REMOVED, DXGI_ERROR_DEVICE_RESET, DXGI_PRESENT},
    },
};

use crate::{Compositor, DeviceResources, ShaderBytecode, shader};

const CLEAR_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Draws the display texture into the overlay window.
pub struct Renderer {
    hwnd: HWND,
    monitor: Size,
    shaders: ShaderBytecode,

    /// Dropped before `resources` so the window is free to take a new target. `None` only while
    /// rebuilding.
    compositor: Option<Compositor>,
    resources: DeviceResources,
}

impl Renderer {
    /// Compile the shaders, create the device resources and bind them to `hwnd`.
    #[instrument("Renderer::new", skip_all, err)]
    pub fn new(hwnd: HWND, monitor: Size) -> Result<Self, Error> {
        let _timer = DebugTime::start("Creating renderer");

        let shaders = ShaderBytecode::compile()?;
        let resources = DeviceResources::new(&shaders, monitor).map_err(Error::CreateResources)?;
        let compositor = Compositor::new(
            &resources.directx.dxgi_device,
            hwnd,
            &resources.swap_chain,
        )
        .map_err(Error::BindCompositor)?;

        Ok(Self {
            hwnd,
            monitor,
            shaders,
            compositor: Some(compositor),
            resources,
        })
    }

    /// The current device resources.
    pub fn resources(&self) -> &DeviceResources {
        &self.resources
    }

    /// The binding of the swap chain to the window.
    pub fn compositor(&self) -> Option<&Compositor> {
        self.compositor.as_ref()
    }
}

impl OverlayRenderer for Renderer {
    type Device = ID3D11Device;
    type Frame = DuplicatedFrame;
    type Error = Error;

    fn device(&self) -> &ID3D11Device {
        &self.resources.directx.device
    }

    fn copy_region(&mut self, frame: &DuplicatedFrame, region: CaptureRegion) {
        let source_box = D3D11_BOX {
            left: region.left,
            top: region.top,
            front: 0,
            right: region.right,
            bottom: region.bottom,
            back: 1,
        };

        unsafe {
            self.resources.directx.context.CopySubresourceRegion(
                &self.resources.display_texture,
                0,
                0,
                0,
                0,
                &frame.texture,
                0,
                Some(&source_box),
            );
        }
    }

    fn upload_transform(&mut self, transform: Transform) -> Result<(), Error> {
        self.resources
            .write_transform(transform)
            .map_err(Error::UploadTransform)
    }

    fn set_viewport(&mut self, size: Size) {
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: size.width as f32,
            Height: size.height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };

        unsafe { self.resources.directx.context.RSSetViewports(Some(&[viewport])) };
    }

    fn draw(&mut self) {
        let resources = &self.resources;
        let context = &resources.directx.context;

        unsafe {
            context.OMSetRenderTargets(Some(&[Some(resources.render_target.clone())]), None);
            context.ClearRenderTargetView(&resources.render_target, &CLEAR_COLOUR);

            context.IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            context.VSSetShader(&resources.vertex_shader, None);
            context.VSSetConstantBuffers(0, Some(&[Some(resources.transform_buffer.clone())]));

            context.PSSetShader(&resources.pixel_shader, None);
            context.PSSetShaderResources(0, Some(&[Some(resources.display_view.clone())]));
            context.PSSetSamplers(0, Some(&[Some(resources.sampler.clone())]));

            context.Draw(3, 0);
        }
    }

    fn present(&mut self) -> Result<(), PresentError<Error>> {
        let result = unsafe { self.resources.swap_chain.Present(0, DXGI_PRESENT(0)) };

        match result {
            code if code == DXGI_ERROR_DEVICE_RESET || code == DXGI_ERROR_DEVICE_REMOVED => {
                Err(PresentError::DeviceLost)
            }
            code => code.ok().map_err(|e| {
                PresentError::Failed(Error::Present(WinError::new(e, "IDXGISwapChain::Present")))
            }),
        }
    }

    #[instrument("Renderer::rebuild", skip_all, err)]
    fn rebuild(&mut self) -> Result<(), Error> {
        let _timer = DebugTime::start("Rebuilding device resources");

        self.compositor = None;

        let resources =
            DeviceResources::new(&self.shaders, self.monitor).map_err(Error::CreateResources)?;
        let compositor = Compositor::new(
            &resources.directx.dxgi_device,
            self.hwnd,
            &resources.swap_chain,
        )
        .map_err(Error::BindCompositor)?;

        self.resources = resources;
        self.compositor = Some(compositor);

        info!("Rebuilt device resources");
        Ok(())
    }
}

/// Renderer failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Compiling the embedded shaders.
    #[error("Failed to compile shaders:\n{0}")]
    CompileShaders(#[from] shader::Error),

    /// Creating the device or one of its resources.
    #[error("Failed to create device resources:\n{0}")]
    CreateResources(#[source] WinError),

    /// Binding the swap chain to the window.
    #[error("Failed to bind the compositor:\n{0}")]
    BindCompositor(#[source] WinError),

    /// Writing the constant buffer.
    #[error("Failed to upload the transform:\n{0}")]
    UploadTransform(#[source] WinError),

    /// Presenting the swap chain.
    #[error("Failed to present:\n{0}")]
    Present(#[source] WinError),
}
