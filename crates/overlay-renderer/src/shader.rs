use thiserror::Error;
use tracing::instrument;
use windows::Win32::Graphics::Direct3D::{
    Fxc::{D3DCOMPILE_ENABLE_STRICTNESS, D3DCOMPILE_PARTIAL_PRECISION, D3DCompile},
    ID3DBlob,
};
use windows_core::{PCSTR, s};

const SOURCE: &str = include_str!("../shaders/overlay.hlsl");

/// Compiled overlay shaders.
///
/// Bytecode doesn't depend on the device so it outlives device rebuilds.
#[derive(Debug, Clone)]
pub struct ShaderBytecode {
    /// Full-screen triangle vertex shader.
    pub vertex: Vec<u8>,

    /// Tinting pixel shader.
    pub pixel: Vec<u8>,
}

impl ShaderBytecode {
    /// Compile the embedded HLSL.
    #[instrument("ShaderBytecode::compile", skip_all, err)]
    pub fn compile() -> Result<Self, Error> {
        let vertex = compile_stage(s!("vs_main"), s!("vs_4_0"), "vertex")?;
        let pixel = compile_stage(s!("ps_main"), s!("ps_4_0"), "pixel")?;

        Ok(Self { vertex, pixel })
    }
}

fn compile_stage(
    entry_point: PCSTR,
    target: PCSTR,
    stage: &'static str,
) -> Result<Vec<u8>, Error> {
    let mut code: Option<ID3DBlob> = None;
    let mut messages: Option<ID3DBlob> = None;

    let result = unsafe {
        D3DCompile(
            SOURCE.as_ptr().cast(),
            SOURCE.len(),
            None,
            None,
            None,
            entry_point,
            target,
            D3DCOMPILE_ENABLE_STRICTNESS | D3DCOMPILE_PARTIAL_PRECISION,
            0,
            &mut code,
            Some(&mut messages),
        )
    };

    if let Err(error) = result {
        let log = messages
            .as_ref()
            .map(|blob| String::from_utf8_lossy(blob_bytes(blob)).into_owned())
            .unwrap_or_else(|| error.message());

        return Err(Error::Compile { stage, log });
    }

    let code = code.ok_or(Error::MissingBytecode(stage))?;
    Ok(blob_bytes(&code).to_vec())
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { core::slice::from_raw_parts(blob.GetBufferPointer().cast(), blob.GetBufferSize()) }
}

/// Shader compilation error.
#[derive(Debug, Error)]
pub enum Error {
    /// The compiler rejected a stage.
    #[error("Failed to compile the {stage} shader:\n{log}")]
    Compile {
        /// The stage that failed.
        stage: &'static str,

        /// The compiler's output.
        log: String,
    },

    /// The compiler reported success without output.
    #[error("Compiling the {0} shader produced no bytecode")]
    MissingBytecode(&'static str),
}
