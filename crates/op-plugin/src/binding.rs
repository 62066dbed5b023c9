//! A single `Binding` owns one dynamic library handle and zero-or-one
//! instantiated implementation (§4.1). `Instantiate()`/`Unload()` are
//! modeled as `instantiate`/`unload` below; a failed load leaves the
//! binding in its pre-load state — no partial handle, no partial instance.

use std::ffi::{c_char, c_void, CStr};
use std::ptr::NonNull;

use libloading::{Library, Symbol};
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};

/// Information the kernel passes to every `CreateInstance` call, regardless
/// of category.
#[repr(C)]
pub struct RuntimeInfo {
    pub kernel_version: u32,
}

/// Callback table a library may invoke back into the kernel (logging, at
/// minimum). Kept intentionally small; categories needing more pass their
/// own extra argument alongside this one.
#[repr(C)]
pub struct Callbacks {
    pub log: extern "C" fn(*const c_char),
}

type GetVersionFn = unsafe extern "C" fn() -> *const c_char;
type CreateInstanceFn =
    unsafe extern "C" fn(*const RuntimeInfo, *const Callbacks, *const c_void) -> *mut c_void;
type DestroyInstanceFn = unsafe extern "C" fn(*mut c_void);

const SYM_GET_VERSION: &[u8] = b"OpenPASS_GetVersion\0";
const SYM_CREATE_INSTANCE: &[u8] = b"OpenPASS_CreateInstance\0";
const SYM_DESTROY_INSTANCE: &[u8] = b"OpenPASS_DestroyInstance\0";

/// Resolves the three C-linkage symbols every plug-in category exposes,
/// lazily, against one open `Library` handle.
struct LibraryWrapper {
    library: Library,
    path: String,
}

impl LibraryWrapper {
    fn open(path: &str) -> PluginResult<Self> {
        let library = unsafe { Library::new(path) }.map_err(|source| PluginError::Load {
            path: path.to_string(),
            source,
        })?;
        Ok(Self {
            library,
            path: path.to_string(),
        })
    }

    fn version(&self) -> PluginResult<String> {
        let get_version: Symbol<GetVersionFn> =
            unsafe { self.library.get(SYM_GET_VERSION) }.map_err(|source| PluginError::Symbol {
                path: self.path.clone(),
                symbol: "OpenPASS_GetVersion".to_string(),
                source,
            })?;
        let raw = unsafe { get_version() };
        let s = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        Ok(s)
    }

    /// # Safety
    /// `extra_args` must point to a value of the type the target library's
    /// category expects, or be null if the category takes none.
    unsafe fn create_instance(
        &self,
        runtime_info: &RuntimeInfo,
        callbacks: &Callbacks,
        extra_args: *const c_void,
    ) -> PluginResult<NonNull<c_void>> {
        let create: Symbol<CreateInstanceFn> = self
            .library
            .get(SYM_CREATE_INSTANCE)
            .map_err(|source| PluginError::Symbol {
                path: self.path.clone(),
                symbol: "OpenPASS_CreateInstance".to_string(),
                source,
            })?;
        let raw = unsafe { create(runtime_info, callbacks, extra_args) };
        NonNull::new(raw).ok_or_else(|| PluginError::InstanceCreationFailed {
            path: self.path.clone(),
        })
    }

    /// # Safety
    /// `instance` must have been returned by this library's
    /// `create_instance` and not already destroyed.
    unsafe fn destroy_instance(&self, instance: NonNull<c_void>) -> PluginResult<()> {
        let destroy: Symbol<DestroyInstanceFn> = self
            .library
            .get(SYM_DESTROY_INSTANCE)
            .map_err(|source| PluginError::Symbol {
                path: self.path.clone(),
                symbol: "OpenPASS_DestroyInstance".to_string(),
                source,
            })?;
        unsafe { destroy(instance.as_ptr()) };
        Ok(())
    }
}

/// Owns a dynamic library and, once instantiated, its single implementation
/// pointer. Exclusive ownership: nothing outside `Binding` may free either.
pub struct Binding {
    path: String,
    library: Option<LibraryWrapper>,
    instance: Option<NonNull<c_void>>,
}

// `instance` is an opaque pointer into a dynamically loaded library, owned
// exclusively by this `Binding` (see struct doc) and never dereferenced by
// this crate — only passed back to the same library's own C functions.
// Moving a `Binding` to another thread carries no more risk than moving the
// `Library` handle itself, which `libloading` already treats as `Send`.
unsafe impl Send for Binding {}

impl Binding {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            library: None,
            instance: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }

    pub fn instance(&self) -> Option<NonNull<c_void>> {
        self.instance
    }

    /// Loads on first call; returns the (possibly freshly created)
    /// implementation pointer. A failure at any stage leaves `self` exactly
    /// as it was before the call — no partial state.
    ///
    /// # Safety
    /// `extra_args` must be valid for the category this binding targets.
    pub unsafe fn instantiate(
        &mut self,
        runtime_info: &RuntimeInfo,
        callbacks: &Callbacks,
        extra_args: *const c_void,
    ) -> PluginResult<NonNull<c_void>> {
        if let Some(instance) = self.instance {
            return Ok(instance);
        }

        if self.library.is_none() {
            let wrapper = LibraryWrapper::open(&self.path)?;
            match wrapper.version() {
                Ok(v) => debug!(path = %self.path, version = %v, "loaded plug-in library"),
                Err(e) => warn!(path = %self.path, error = %e, "GetVersion failed after load"),
            }
            self.library = Some(wrapper);
        }

        let wrapper = self.library.as_ref().expect("just populated");
        match unsafe { wrapper.create_instance(runtime_info, callbacks, extra_args) } {
            Ok(ptr) => {
                self.instance = Some(ptr);
                Ok(ptr)
            }
            Err(e) => {
                warn!(path = %self.path, error = %e, "CreateInstance failed; unloading");
                self.library = None;
                Err(e)
            }
        }
    }

    /// Destroys the implementation (if any) then unloads the handle.
    pub fn unload(&mut self) -> PluginResult<()> {
        if let (Some(instance), Some(wrapper)) = (self.instance.take(), self.library.as_ref()) {
            unsafe { wrapper.destroy_instance(instance) }?;
        }
        self.library = None;
        Ok(())
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        if self.instance.is_some() {
            if let Err(e) = self.unload() {
                warn!(path = %self.path, error = %e, "error unloading binding during drop");
            }
        }
    }
}
