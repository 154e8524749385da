//! The C callback boundary
//!
//! The engine-side shim invokes one function pointer,
//! `void cb(const char *name, void *block)`, for every paint or measurement
//! request. [`host_callback`] is that function. It resolves `name` to a
//! [`Callback`], decodes the block into a [`PaintOp`], applies it to the
//! container bound by [`with_container`] and writes any reply back into the
//! block.
//!
//! The C signature carries no user-data pointer, so the active container
//! lives in a thread-local slot for the duration of one render. Errors and
//! panics are stopped here; the first one is handed back from
//! [`with_container`] once the engine returns.

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CStr};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use log::{debug, error, trace};

use crate::error::{Error, Result};
use crate::rendering::paint::PaintOp;
use crate::DocumentContainer;

pub mod blocks;

use blocks::{
    CreateFontBlock, DrawBackgroundBlock, DrawBordersBlock, DrawMarkerBlock, DrawTextBlock, ParamBlock,
    Pt2PxBlock, TextWidthBlock,
};

/// Signature of the host callback handed to the engine.
pub type HostCallback = unsafe extern "C" fn(name: *const c_char, block: *mut c_void);

/// Requests the engine can issue, keyed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    CreateFont,
    TextWidth,
    DrawText,
    DrawBackground,
    DrawBorders,
    DrawMarker,
    Pt2Px,
}

impl Callback {
    pub const ALL: [Callback; 7] = [
        Callback::CreateFont,
        Callback::TextWidth,
        Callback::DrawText,
        Callback::DrawBackground,
        Callback::DrawBorders,
        Callback::DrawMarker,
        Callback::Pt2Px,
    ];

    /// The name the engine passes as the first callback argument.
    pub const fn name(self) -> &'static str {
        match self {
            Callback::CreateFont => "createFont",
            Callback::TextWidth => "textWidth",
            Callback::DrawText => "drawText",
            Callback::DrawBackground => "drawBackground",
            Callback::DrawBorders => "drawBorders",
            Callback::DrawMarker => "drawMarker",
            Callback::Pt2Px => "pt2px",
        }
    }

    /// NUL-terminated form of [`Callback::name`], for calling through the C signature.
    pub const fn c_name(self) -> &'static CStr {
        match self {
            Callback::CreateFont => c"createFont",
            Callback::TextWidth => c"textWidth",
            Callback::DrawText => c"drawText",
            Callback::DrawBackground => c"drawBackground",
            Callback::DrawBorders => c"drawBorders",
            Callback::DrawMarker => c"drawMarker",
            Callback::Pt2Px => c"pt2px",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Callback {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Callback::ALL
            .into_iter()
            .find(|cb| cb.name() == s)
            .ok_or_else(|| Error::UnknownCallback(s.to_string()))
    }
}

/// Decode one request and apply it to `container`.
///
/// # Safety
/// `name` must be null or a NUL-terminated string. `block` must be null or
/// point to the parameter block matching `name`, valid for reads and writes
/// for the duration of the call.
pub unsafe fn dispatch(container: &mut dyn DocumentContainer, name: *const c_char, block: *mut c_void) -> Result<()> {
    let name = unsafe { callback_name(name) };
    let callback: Callback = name.parse()?;
    debug!("callback {}", callback);
    unsafe {
        match callback {
            Callback::CreateFont => handle::<CreateFontBlock>(container, block),
            Callback::TextWidth => handle::<TextWidthBlock>(container, block),
            Callback::DrawText => handle::<DrawTextBlock>(container, block),
            Callback::DrawBackground => handle::<DrawBackgroundBlock>(container, block),
            Callback::DrawBorders => handle::<DrawBordersBlock>(container, block),
            Callback::DrawMarker => handle::<DrawMarkerBlock>(container, block),
            Callback::Pt2Px => handle::<Pt2PxBlock>(container, block),
        }
    }
}

unsafe fn handle<B: ParamBlock>(container: &mut dyn DocumentContainer, block: *mut c_void) -> Result<()> {
    let block = unsafe { block.cast::<B>().as_mut() }.ok_or(Error::NullBlock(B::CALLBACK.name()))?;
    let op: PaintOp = unsafe { block.decode() };
    trace!("decoded {:?}", op);
    let reply = op.apply(container)?;
    block.store(&reply);
    Ok(())
}

unsafe fn callback_name(name: *const c_char) -> String {
    if name.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
}

struct ActiveRender {
    container: *mut (dyn DocumentContainer + 'static),
    first_error: Option<Error>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveRender>> = const { RefCell::new(None) };
}

/// Clears the slot even if the engine call unwinds.
struct SlotGuard;

impl Drop for SlotGuard {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

/// Bind `container` as the target of [`host_callback`] while `f` runs.
///
/// Returns `f`'s value, or the first error a callback hit during the call.
pub fn with_container<R>(container: &mut dyn DocumentContainer, f: impl FnOnce() -> R) -> Result<R> {
    let ptr: *mut (dyn DocumentContainer + '_) = container;
    // SAFETY: only the pointer's lifetime bound is erased. SlotGuard removes it
    // from the slot before this function returns, so it never outlives the borrow.
    let ptr: *mut (dyn DocumentContainer + 'static) = unsafe { std::mem::transmute(ptr) };

    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(Error::SessionBusy);
        }
        *slot = Some(ActiveRender { container: ptr, first_error: None });
        Ok(())
    })?;

    let guard = SlotGuard;
    let value = f();
    let first_error = ACTIVE.with(|slot| slot.borrow_mut().as_mut().and_then(|active| active.first_error.take()));
    drop(guard);

    match first_error {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// The function pointer handed to the engine.
///
/// Never unwinds: handler errors and panics are logged and parked for
/// [`with_container`] to return.
///
/// # Safety
/// Same contract as [`dispatch`].
pub unsafe extern "C" fn host_callback(name: *const c_char, block: *mut c_void) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let container = ACTIVE.with(|slot| slot.borrow().as_ref().map(|active| active.container));
        let Some(container) = container else {
            return Err(Error::RenderError("callback arrived outside of a render".into()));
        };
        // SAFETY: the slot holds a live exclusive borrow for the duration of the
        // render, and the engine calls back on the rendering thread only.
        unsafe { dispatch(&mut *container, name, block) }
    }));

    let err = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err,
        Err(_) => Error::CallbackPanicked(unsafe { callback_name(name) }),
    };
    error!("callback failed: {}", err);
    ACTIVE.with(|slot| {
        if let Some(active) = slot.borrow_mut().as_mut() {
            active.first_error.get_or_insert(err);
        }
    });
}
