use tracing::{info, instrument};
use windows::Win32::{
    Foundation::{E_POINTER, HMODULE},
    Graphics::{
        Direct3D::{D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_WARP},
        Direct3D11::{
            D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_SDK_VERSION, D3D11CreateDevice, ID3D11Device,
            ID3D11DeviceContext,
        },
        Dxgi::{DXGI_ERROR_UNSUPPORTED, IDXGIAdapter, IDXGIDevice, IDXGIOutput1},
    },
};
use windows_core::{Interface, Result as WindowsResult};

use crate::{LabelledWinResult, WinError};

/// The Direct3D 11 device the overlay renders with and duplicates the desktop against.
pub struct DirectX {
    /// Creates every GPU resource.
    pub device: ID3D11Device,

    /// Records copies and draws.
    pub context: ID3D11DeviceContext,

    /// Backs the composition swap chain and compositor device.
    pub dxgi_device: IDXGIDevice,

    /// The adapter the device runs on, its first output is the primary monitor.
    pub adapter: IDXGIAdapter,
}

impl DirectX {
    /// Create a hardware device, or a WARP device if hardware is unsupported.
    #[instrument("DirectX::new", skip_all, err)]
    pub fn new() -> LabelledWinResult<Self> {
        let device = match create_device(D3D_DRIVER_TYPE_HARDWARE) {
            Err(error) if error.code() == DXGI_ERROR_UNSUPPORTED => {
                info!("Hardware device unsupported, falling back to WARP");
                create_device(D3D_DRIVER_TYPE_WARP)
            }
            result => result,
        }
        .map_err(|e| WinError::new(e, "D3D11CreateDevice"))?
        .ok_or_else(|| WinError::from_hresult(E_POINTER, "D3D11CreateDevice"))?;

        let context = unsafe { device.GetImmediateContext() }
            .map_err(|e| WinError::new(e, "ID3D11Device::GetImmediateContext"))?;

        let dxgi_device: IDXGIDevice = device
            .cast()
            .map_err(|e| WinError::new(e, "ID3D11Device::cast"))?;

        let adapter = unsafe { dxgi_device.GetAdapter() }
            .map_err(|e| WinError::new(e, "IDXGIDevice::GetAdapter"))?;

        Ok(Self {
            device,
            context,
            dxgi_device,
            adapter,
        })
    }

    /// The adapter's first output, the primary monitor.
    pub fn primary_output(&self) -> LabelledWinResult<IDXGIOutput1> {
        primary_output(&self.adapter)
    }
}

/// The first output of `adapter`.
pub(crate) fn primary_output(adapter: &IDXGIAdapter) -> LabelledWinResult<IDXGIOutput1> {
    let output = unsafe { adapter.EnumOutputs(0) }
        .map_err(|e| WinError::new(e, "IDXGIAdapter::EnumOutputs"))?;

    output
        .cast()
        .map_err(|e| WinError::new(e, "IDXGIOutput::cast"))
}

fn create_device(driver_type: D3D_DRIVER_TYPE) -> WindowsResult<Option<ID3D11Device>> {
    let mut device = None;

    unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            HMODULE::default(),
            D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            None,
        )
    }?;

    Ok(device)
}
