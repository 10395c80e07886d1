use bytemuck::{Pod, Zeroable};
use desktop_duplication::{DirectX, LabelledWinResult, WinError};
use overlay_core::{Size, Transform};
use tracing::instrument;
use windows::Win32::{
    Foundation::E_POINTER,
    Graphics::{
        Direct3D11::{
            D3D11_BIND_CONSTANT_BUFFER, D3D11_BIND_SHADER_RESOURCE, D3D11_BUFFER_DESC,
            D3D11_COMPARISON_NEVER, D3D11_CPU_ACCESS_WRITE, D3D11_FILTER_MIN_MAG_LINEAR_MIP_POINT,
            D3D11_FLOAT32_MAX, D3D11_MAP_WRITE_DISCARD, D3D11_MAPPED_SUBRESOURCE,
            D3D11_RENDER_TARGET_VIEW_DESC, D3D11_RENDER_TARGET_VIEW_DESC_0,
            D3D11_RTV_DIMENSION_TEXTURE2D, D3D11_SAMPLER_DESC, D3D11_TEX2D_RTV,
            D3D11_TEXTURE_ADDRESS_WRAP, D3D11_TEXTURE2D_DESC, D3D11_USAGE_DEFAULT,
            D3D11_USAGE_DYNAMIC, ID3D11Buffer, ID3D11PixelShader, ID3D11RenderTargetView,
            ID3D11SamplerState, ID3D11ShaderResourceView, ID3D11Texture2D, ID3D11VertexShader,
        },
        Dxgi::{
            Common::{
                DXGI_ALPHA_MODE_PREMULTIPLIED, DXGI_FORMAT_B8G8R8A8_UNORM,
                DXGI_FORMAT_B8G8R8A8_UNORM_SRGB, DXGI_SAMPLE_DESC,
            },
            DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1, DXGI_SWAP_EFFECT_FLIP_DISCARD,
            DXGI_USAGE_RENDER_TARGET_OUTPUT, IDXGIFactory2, IDXGISwapChain1,
        },
    },
};

use crate::ShaderBytecode;

/// The constant buffer layout, padded to the 16 byte register size.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformBuffer {
    /// Scale applied to the texture coordinates.
    pub transform: [f32; 2],
    _padding: [f32; 2],
}

impl From<Transform> for TransformBuffer {
    fn from(transform: Transform) -> Self {
        Self {
            transform: [transform.x, transform.y],
            _padding: [0.0; 2],
        }
    }
}

/// Every resource that belongs to one Direct3D device.
pub struct DeviceResources {
    /// The device and its context.
    pub directx: DirectX,

    pub(crate) vertex_shader: ID3D11VertexShader,
    pub(crate) pixel_shader: ID3D11PixelShader,

    pub(crate) transform_buffer: ID3D11Buffer,

    /// Monitor-sized copy destination, only the top-left capture-region-sized corner is sampled.
    pub(crate) display_texture: ID3D11Texture2D,
    pub(crate) display_view: ID3D11ShaderResourceView,
    pub(crate) sampler: ID3D11SamplerState,

    pub(crate) swap_chain: IDXGISwapChain1,
    pub(crate) render_target: ID3D11RenderTargetView,
}

impl DeviceResources {
    /// Create a device and everything drawn with it.
    #[instrument("DeviceResources::new", skip_all, err)]
    pub fn new(shaders: &ShaderBytecode, monitor: Size) -> LabelledWinResult<Self> {
        let directx = DirectX::new()?;
        let device = &directx.device;

        let vertex_shader = {
            let mut shader = None;
            unsafe { device.CreateVertexShader(&shaders.vertex, None, Some(&mut shader)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreateVertexShader"))?;
            created(shader, "ID3D11Device::CreateVertexShader")?
        };

        let pixel_shader = {
            let mut shader = None;
            unsafe { device.CreatePixelShader(&shaders.pixel, None, Some(&mut shader)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreatePixelShader"))?;
            created(shader, "ID3D11Device::CreatePixelShader")?
        };

        let transform_buffer = {
            let descriptor = D3D11_BUFFER_DESC {
                ByteWidth: size_of::<TransformBuffer>() as u32,
                Usage: D3D11_USAGE_DYNAMIC,
                BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
                CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
                ..Default::default()
            };

            let mut buffer = None;
            unsafe { device.CreateBuffer(&descriptor, None, Some(&mut buffer)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreateBuffer"))?;
            created(buffer, "ID3D11Device::CreateBuffer")?
        };

        let display_texture = {
            let descriptor = D3D11_TEXTURE2D_DESC {
                Width: monitor.width,
                Height: monitor.height,
                MipLevels: 1,
                ArraySize: 1,
                Format: DXGI_FORMAT_B8G8R8A8_UNORM,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                Usage: D3D11_USAGE_DEFAULT,
                BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
                ..Default::default()
            };

            let mut texture = None;
            unsafe { device.CreateTexture2D(&descriptor, None, Some(&mut texture)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreateTexture2D"))?;
            created(texture, "ID3D11Device::CreateTexture2D")?
        };

        let display_view = {
            let mut view = None;
            unsafe { device.CreateShaderResourceView(&display_texture, None, Some(&mut view)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreateShaderResourceView"))?;
            created(view, "ID3D11Device::CreateShaderResourceView")?
        };

        let sampler = {
            let descriptor = D3D11_SAMPLER_DESC {
                Filter: D3D11_FILTER_MIN_MAG_LINEAR_MIP_POINT,
                AddressU: D3D11_TEXTURE_ADDRESS_WRAP,
                AddressV: D3D11_TEXTURE_ADDRESS_WRAP,
                AddressW: D3D11_TEXTURE_ADDRESS_WRAP,
                MipLODBias: 0.0,
                MaxAnisotropy: 0,
                ComparisonFunc: D3D11_COMPARISON_NEVER,
                BorderColor: [0.0; 4],
                MinLOD: -D3D11_FLOAT32_MAX,
                MaxLOD: D3D11_FLOAT32_MAX,
            };

            let mut sampler = None;
            unsafe { device.CreateSamplerState(&descriptor, Some(&mut sampler)) }
                .map_err(|e| WinError::new(e, "ID3D11Device::CreateSamplerState"))?;
            created(sampler, "ID3D11Device::CreateSamplerState")?
        };

        let swap_chain = {
            let factory: IDXGIFactory2 = unsafe { directx.adapter.GetParent() }
                .map_err(|e| WinError::new(e, "IDXGIAdapter::GetParent"))?;

            let descriptor = DXGI_SWAP_CHAIN_DESC1 {
                Width: monitor.width,
                Height: monitor.height,
                Format: DXGI_FORMAT_B8G8R8A8_UNORM,
                Stereo: false.into(),
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: 2,
                Scaling: DXGI_SCALING_STRETCH,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                AlphaMode: DXGI_ALPHA_MODE_PREMULTIPLIED,
                Flags: 0,
            };

            unsafe { factory.CreateSwapChainForComposition(device, &descriptor, None) }
                .map_err(|e| WinError::new(e, "IDXGIFactory2::CreateSwapChainForComposition"))?
        };

        let render_target = {
            let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0) }
                .map_err(|e| WinError::new(e, "IDXGISwapChain1::GetBuffer"))?;

            // The swap chain itself can't be sRGB with flip presentation, the view can.
            let descriptor = D3D11_RENDER_TARGET_VIEW_DESC {
                Format: DXGI_FORMAT_B8G8R8A8_UNORM_SRGB,
                ViewDimension: D3D11_RTV_DIMENSION_TEXTURE2D,
                Anonymous: D3D11_RENDER_TARGET_VIEW_DESC_0 {
                    Texture2D: D3D11_TEX2D_RTV { MipSlice: 0 },
                },
            };

            let mut view = None;
            unsafe {
                device.CreateRenderTargetView(&back_buffer, Some(&descriptor), Some(&mut view))
            }
            .map_err(|e| WinError::new(e, "ID3D11Device::CreateRenderTargetView"))?;
            created(view, "ID3D11Device::CreateRenderTargetView")?
        };

        Ok(Self {
            directx,
            vertex_shader,
            pixel_shader,
            transform_buffer,
            display_texture,
            display_view,
            sampler,
            swap_chain,
            render_target,
        })
    }

    /// Overwrite the constant buffer with `transform`.
    pub fn write_transform(&self, transform: Transform) -> LabelledWinResult<()> {
        let buffer = TransformBuffer::from(transform);
        let bytes = bytemuck::bytes_of(&buffer);

        let context = &self.directx.context;
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();

        unsafe {
            context.Map(
                &self.transform_buffer,
                0,
                D3D11_MAP_WRITE_DISCARD,
                0,
                Some(&mut mapped),
            )
        }
        .map_err(|e| WinError::new(e, "ID3D11DeviceContext::Map"))?;

        unsafe {
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData.cast::<u8>(), bytes.len());
            context.Unmap(&self.transform_buffer, 0);
        }

        Ok(())
    }
}

/// Unwrap a creation out-parameter that the call left empty despite succeeding.
fn created<T>(value: Option<T>, call: &'static str) -> LabelledWinResult<T> {
    value.ok_or_else(|| WinError::from_hresult(E_POINTER, call))
}
