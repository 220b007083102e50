// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! extensions: resolves the dma-buf import entry points once, up front.
//!
//! The import path needs three extension functions that are not part of any
//! EGL/GL link-time interface. They are resolved into an explicit capability
//! table during device-context initialization and passed by reference into
//! the bridge, so a missing extension surfaces at startup rather than at the
//! first frame.

use std::ffi::CString;
use std::mem;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use khronos_egl as egl;
use libloading::Library;
use log::warn;

use crate::primebuf_utils::PrimebufError;
use crate::primebuf_utils::PrimebufResult;

pub type RawEglDisplay = *mut c_void;
pub type RawEglContext = *mut c_void;
pub type RawEglImage = *mut c_void;
pub type RawEglClientBuffer = *mut c_void;

pub(crate) type EglCreateImageKhrFn = unsafe extern "system" fn(
    RawEglDisplay,
    RawEglContext,
    egl::Enum,
    RawEglClientBuffer,
    *const egl::Int,
) -> RawEglImage;

pub(crate) type EglDestroyImageKhrFn =
    unsafe extern "system" fn(RawEglDisplay, RawEglImage) -> egl::Boolean;

pub(crate) type GlEglImageTargetTexture2DOesFn =
    unsafe extern "system" fn(gl::types::GLenum, *mut c_void);

pub(crate) type EglGetErrorFn = unsafe extern "system" fn() -> egl::Int;

/// The dynamically resolved entry points the import bridge depends on.
///
/// Resolved once; the embedder keeps the table alive for as long as any bridge
/// borrows it.
pub struct ImageExtensions {
    pub(crate) create_image: EglCreateImageKhrFn,
    pub(crate) destroy_image: EglDestroyImageKhrFn,
    pub(crate) image_target_texture: GlEglImageTargetTexture2DOesFn,
    pub(crate) get_error: EglGetErrorFn,
    _libegl: Option<Library>,
}

fn lookup(
    egl: &egl::DynamicInstance<egl::EGL1_4>,
    name: &'static str,
) -> PrimebufResult<extern "system" fn()> {
    egl.get_proc_address(name)
        .ok_or(PrimebufError::MissingExtension(name))
}

impl ImageExtensions {
    /// Resolves the capability table. Also resolves the core GL symbols the
    /// first time it is called in a process.
    pub fn load(egl: &egl::DynamicInstance<egl::EGL1_4>) -> PrimebufResult<ImageExtensions> {
        load_gl_symbols(egl);

        // Safe because the signatures below are the ones the extension
        // specifications define for these entry points.
        let create_image: EglCreateImageKhrFn =
            unsafe { mem::transmute(lookup(egl, "eglCreateImageKHR")?) };
        let destroy_image: EglDestroyImageKhrFn =
            unsafe { mem::transmute(lookup(egl, "eglDestroyImageKHR")?) };
        let image_target_texture: GlEglImageTargetTexture2DOesFn =
            unsafe { mem::transmute(lookup(egl, "glEGLImageTargetTexture2DOES")?) };

        // eglGetError is a core function; implementations predating EGL 1.5 do
        // not hand out core functions through eglGetProcAddress, so fall back
        // to the library symbol.
        let (get_error, _libegl) = match egl.get_proc_address("eglGetError") {
            Some(f) => {
                let get_error: EglGetErrorFn = unsafe { mem::transmute(f) };
                (get_error, None)
            }
            None => {
                let lib = unsafe { Library::new("libEGL.so.1") }
                    .map_err(|_| PrimebufError::MissingExtension("eglGetError"))?;
                let get_error = unsafe {
                    lib.get::<EglGetErrorFn>(b"eglGetError\0")
                        .map(|symbol| *symbol)
                        .map_err(|_| PrimebufError::MissingExtension("eglGetError"))?
                };
                (get_error, Some(lib))
            }
        };

        Ok(ImageExtensions {
            create_image,
            destroy_image,
            image_target_texture,
            get_error,
            _libegl,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        create_image: EglCreateImageKhrFn,
        destroy_image: EglDestroyImageKhrFn,
        image_target_texture: GlEglImageTargetTexture2DOesFn,
        get_error: EglGetErrorFn,
    ) -> ImageExtensions {
        ImageExtensions {
            create_image,
            destroy_image,
            image_target_texture,
            get_error,
            _libegl: None,
        }
    }
}

static GL_SYMBOLS_LOADED: AtomicBool = AtomicBool::new(false);

/// Resolves the core GL function pointers the `gl` crate dispatches through.
/// They are process-wide state in that crate, so this runs at most once.
fn load_gl_symbols(egl: &egl::DynamicInstance<egl::EGL1_4>) {
    if GL_SYMBOLS_LOADED
        .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
        .is_err()
    {
        return;
    }

    let gles = match unsafe { Library::new("libGLESv2.so.2") } {
        Ok(lib) => Some(lib),
        Err(e) => {
            warn!("libGLESv2 not loadable, using eglGetProcAddress only: {}", e);
            None
        }
    };

    gl::load_with(|name| {
        if let Some(lib) = gles.as_ref() {
            if let Ok(c_name) = CString::new(name) {
                let symbol = unsafe {
                    lib.get::<unsafe extern "system" fn()>(c_name.as_bytes_with_nul())
                };
                if let Ok(symbol) = symbol {
                    return *symbol as *const c_void;
                }
            }
        }
        egl.get_proc_address(name)
            .map(|f| f as *const c_void)
            .unwrap_or(ptr::null())
    });

    // The resolved symbols must stay valid for the rest of the process, so the
    // library handle is never dropped.
    if let Some(lib) = gles {
        mem::forget(lib);
    }
}
