// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::num::NonZeroUsize;

use libc::c_void;
use libc::off_t;
use nix::sys::mman::mmap;
use nix::sys::mman::munmap;
use nix::sys::mman::MapFlags;
use nix::sys::mman::ProtFlags;

use crate::primebuf_os::descriptor::AsRawDescriptor;
use crate::primebuf_utils::PrimebufError;
use crate::primebuf_utils::PrimebufResult;

use crate::primebuf_utils::PRIMEBUF_MAP_ACCESS_MASK;
use crate::primebuf_utils::PRIMEBUF_MAP_ACCESS_READ;
use crate::primebuf_utils::PRIMEBUF_MAP_ACCESS_RW;
use crate::primebuf_utils::PRIMEBUF_MAP_ACCESS_WRITE;

/// Wraps a shared memory mapping in the current process. Provides RAII semantics
/// including munmap when no longer needed.
#[derive(Debug)]
pub struct MemoryMapping {
    pub addr: *mut c_void,
    pub size: usize,
}

impl Drop for MemoryMapping {
    fn drop(&mut self) {
        // This is safe because we mmap the area at addr ourselves, and nobody
        // else is holding a reference to it.
        unsafe {
            munmap(self.addr, self.size).unwrap();
        }
    }
}

impl MemoryMapping {
    /// Maps `size` bytes of `descriptor`, starting `offset` bytes into it. Dumb buffers
    /// are mapped through the device descriptor at the offset returned by the map-dumb
    /// request, which is why the offset is part of this interface.
    pub fn from_offset(
        descriptor: &dyn AsRawDescriptor,
        offset: u64,
        size: usize,
        map_info: u32,
    ) -> PrimebufResult<MemoryMapping> {
        let non_zero_opt = NonZeroUsize::new(size);
        let prot = match map_info & PRIMEBUF_MAP_ACCESS_MASK {
            PRIMEBUF_MAP_ACCESS_READ => ProtFlags::PROT_READ,
            PRIMEBUF_MAP_ACCESS_WRITE => ProtFlags::PROT_WRITE,
            PRIMEBUF_MAP_ACCESS_RW => ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            _ => return Err(PrimebufError::SpecViolation("incorrect access flags")),
        };

        let offset: off_t = offset
            .try_into()
            .map_err(|_| PrimebufError::SpecViolation("mapping offset overflows off_t"))?;

        if let Some(non_zero_size) = non_zero_opt {
            let addr = unsafe {
                mmap(
                    None,
                    non_zero_size,
                    prot,
                    MapFlags::MAP_SHARED,
                    descriptor.as_raw_descriptor(),
                    offset,
                )
                .map_err(|e| PrimebufError::MappingError(e as i32))?
            };
            Ok(MemoryMapping { addr, size })
        } else {
            Err(PrimebufError::SpecViolation("zero size mapping"))
        }
    }
}
