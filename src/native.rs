//! Native engine: the litehtml container shim linked at build time
//!
//! The shim exports three C functions. `container_create` builds a
//! container that forwards every paint request to the host callback,
//! `container_render` parses, lays out and draws one NUL-terminated
//! document, and `container_delete` frees the container.

use std::ffi::{c_char, c_int, CString};

use log::{debug, info};

use crate::bridge::HostCallback;
use crate::error::{Error, Result};
use crate::{LayoutEngine, Viewport};

mod ffi {
    use super::*;

    #[link(name = "litehtml_container")]
    extern "C" {
        pub fn container_create(width: c_int, height: c_int, callback: HostCallback) -> usize;
        pub fn container_delete(container: usize);
        pub fn container_render(container: usize, html: *const c_char);
    }
}

/// One native rendering session.
pub struct NativeEngine {
    handle: Option<usize>,
}

impl NativeEngine {
    pub fn new(viewport: Viewport, callback: HostCallback) -> Result<Self> {
        let width = c_int::try_from(viewport.width)
            .map_err(|_| Error::ConfigError(format!("viewport width {} too large", viewport.width)))?;
        let height = c_int::try_from(viewport.height)
            .map_err(|_| Error::ConfigError(format!("viewport height {} too large", viewport.height)))?;

        // SAFETY: plain FFI call; the callback is a valid `extern "C"` function.
        let handle = unsafe { ffi::container_create(width, height, callback) };
        if handle == 0 {
            return Err(Error::InitializationError("container_create returned null".into()));
        }
        debug!("native container {:#x} created ({}x{})", handle, width, height);
        Ok(Self { handle: Some(handle) })
    }
}

impl LayoutEngine for NativeEngine {
    fn render(&mut self, document: &[u8]) -> Result<()> {
        let handle = self
            .handle
            .ok_or_else(|| Error::RenderError("native container already closed".into()))?;
        let html = CString::new(document).map_err(|e| {
            Error::InvalidDocument(format!("NUL byte at offset {}", e.nul_position()))
        })?;
        info!("native render of {} bytes", document.len());
        // SAFETY: `handle` came from `container_create` and has not been deleted;
        // `html` outlives the call.
        unsafe { ffi::container_render(handle, html.as_ptr()) };
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            // SAFETY: taken out of `self`, so it is deleted exactly once.
            unsafe { ffi::container_delete(handle) };
            debug!("native container {:#x} deleted", handle);
        }
        Ok(())
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
