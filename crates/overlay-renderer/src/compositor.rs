use desktop_duplication::{LabelledWinResult, WinError};
use tracing::instrument;
use windows::Win32::{
    Foundation::HWND,
    Graphics::{
        DirectComposition::{
            DCompositionCreateDevice, IDCompositionDevice, IDCompositionTarget,
            IDCompositionVisual,
        },
        Dxgi::{IDXGIDevice, IDXGISwapChain1},
    },
};

/// Presents a swap chain as the sole content of a window.
///
/// A window accepts one composition target at a time, the old compositor must be dropped before
/// binding a new one.
pub struct Compositor {
    device: IDCompositionDevice,
    _target: IDCompositionTarget,
    _visual: IDCompositionVisual,
}

impl Compositor {
    /// Bind `swap_chain` to `hwnd` as the topmost visual.
    #[instrument("Compositor::new", skip_all, err)]
    pub fn new(
        dxgi_device: &IDXGIDevice,
        hwnd: HWND,
        swap_chain: &IDXGISwapChain1,
    ) -> LabelledWinResult<Self> {
        let device: IDCompositionDevice = unsafe { DCompositionCreateDevice(dxgi_device) }
            .map_err(|e| WinError::new(e, "DCompositionCreateDevice"))?;

        let target = unsafe { device.CreateTargetForHwnd(hwnd, true) }
            .map_err(|e| WinError::new(e, "IDCompositionDevice::CreateTargetForHwnd"))?;

        let visual = unsafe { device.CreateVisual() }
            .map_err(|e| WinError::new(e, "IDCompositionDevice::CreateVisual"))?;

        unsafe { visual.SetContent(swap_chain) }
            .map_err(|e| WinError::new(e, "IDCompositionVisual::SetContent"))?;

        unsafe { target.SetRoot(&visual) }
            .map_err(|e| WinError::new(e, "IDCompositionTarget::SetRoot"))?;

        let compositor = Self {
            device,
            _target: target,
            _visual: visual,
        };
        compositor.commit()?;

        Ok(compositor)
    }

    /// Commit pending changes to the visual tree.
    pub fn commit(&self) -> LabelledWinResult<()> {
        unsafe { self.device.Commit() }.map_err(|e| WinError::new(e, "IDCompositionDevice::Commit"))
    }
}
