// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CString;
use std::fs::File;
use std::fs::OpenOptions;
use std::os::raw::c_char;
use std::os::raw::c_int;
use std::os::raw::c_uint;
#[cfg(target_pointer_width = "64")]
use std::os::raw::c_ulong;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::null_mut;

use nix::ioctl_readwrite;
use zerocopy::AsBytes;
use zerocopy::FromBytes;

use crate::primebuf_utils::PrimebufError;
use crate::primebuf_utils::PrimebufResult;

// Consistent with __kernel_size_t in include/uapi/asm-generic/posix_types.h.
#[cfg(not(target_pointer_width = "64"))]
#[allow(non_camel_case_types)]
type __kernel_size_t = c_uint;
#[cfg(target_pointer_width = "64")]
#[allow(non_camel_case_types)]
type __kernel_size_t = c_ulong;

pub const DRM_IOCTL_BASE: c_uint = 0x64;
const DRM_IOCTL_VERSION: c_uint = 0x00;
const DRM_IOCTL_GET_CAP: c_uint = 0x0c;

const DRM_CAP_DUMB_BUFFER: u64 = 0x1;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct drm_version {
    version_major: c_int,
    version_minor: c_int,
    version_patchlevel: c_int,
    name_len: __kernel_size_t,
    name: *mut c_char,
    date_len: __kernel_size_t,
    date: *mut c_char,
    desc_len: __kernel_size_t,
    desc: *mut c_char,
}

#[repr(C)]
#[derive(Copy, Clone, Default, AsBytes, FromBytes)]
pub struct drm_get_cap {
    capability: u64,
    value: u64,
}

ioctl_readwrite!(
    drm_get_version,
    DRM_IOCTL_BASE,
    DRM_IOCTL_VERSION,
    drm_version
);

ioctl_readwrite!(drm_get_capability, DRM_IOCTL_BASE, DRM_IOCTL_GET_CAP, drm_get_cap);

fn get_drm_device_name(fd: &File) -> PrimebufResult<String> {
    let mut version = drm_version {
        version_major: 0,
        version_minor: 0,
        version_patchlevel: 0,
        name_len: 0,
        name: null_mut(),
        date_len: 0,
        date: null_mut(),
        desc_len: 0,
        desc: null_mut(),
    };

    // Get the length of the device name.
    unsafe {
        drm_get_version(fd.as_raw_fd(), &mut version)?;
    }

    // Enough bytes to hold the device name and terminating null character.
    let mut name_bytes: Vec<u8> = vec![0; (version.name_len + 1) as usize];
    let mut version = drm_version {
        version_major: 0,
        version_minor: 0,
        version_patchlevel: 0,
        name_len: name_bytes.len() as __kernel_size_t,
        name: name_bytes.as_mut_ptr() as *mut c_char,
        date_len: 0,
        date: null_mut(),
        desc_len: 0,
        desc: null_mut(),
    };

    // Safe as no more than name_len + 1 bytes will be written to name.
    unsafe {
        drm_get_version(fd.as_raw_fd(), &mut version)?;
    }

    CString::new(&name_bytes[..(version.name_len as usize)])?
        .into_string()
        .map_err(|_| PrimebufError::SpecViolation("couldn't convert string"))
}

/// Returns true if the device behind `fd` can allocate dumb buffers.
pub fn supports_dumb_buffers(fd: &File) -> bool {
    let mut cap = drm_get_cap::new_zeroed();
    cap.capability = DRM_CAP_DUMB_BUFFER;

    // Safe because the capability struct is a stack variable of the correct type.
    match unsafe { drm_get_capability(fd.as_raw_fd(), &mut cap) } {
        Ok(_) => cap.value != 0,
        Err(_) => false,
    }
}

/// Returns a `fd` for an opened card node able to allocate dumb buffers, while
/// filtering out specified undesired drivers. Dumb buffer requests are a
/// primary-node capability, so the card minors are scanned rather than the
/// render minors.
pub fn open_device(undesired: &[&str]) -> PrimebufResult<File> {
    const DRM_DIR_NAME: &str = "/dev/dri";
    const DRM_MAX_MINOR: u32 = 15;

    for n in 0..=DRM_MAX_MINOR {
        let path = Path::new(DRM_DIR_NAME).join(format!("card{}", n));

        if let Ok(fd) = OpenOptions::new().read(true).write(true).open(path) {
            if let Ok(name) = get_drm_device_name(&fd) {
                if !undesired.iter().any(|item| *item == name) && supports_dumb_buffers(&fd) {
                    return Ok(fd);
                }
            }
        }
    }

    Err(PrimebufError::SpecViolation("no DRM card node opened"))
}
