// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::cmp;
use std::ptr;

use crate::primebuf_os::sys::platform::MemoryMapping as PlatformMapping;
use crate::primebuf_os::AsRawDescriptor;
use crate::primebuf_utils::PrimebufResult;

pub struct MemoryMapping {
    mapping: PlatformMapping,
}

impl MemoryMapping {
    pub fn from_offset(
        descriptor: &dyn AsRawDescriptor,
        offset: u64,
        size: usize,
        map_info: u32,
    ) -> PrimebufResult<MemoryMapping> {
        let mapping = PlatformMapping::from_offset(descriptor, offset, size, map_info)?;
        Ok(MemoryMapping { mapping })
    }

    pub fn size(&self) -> usize {
        self.mapping.size
    }

    /// Copies `source` into the mapping, clamped to the mapping size. The count is
    /// never derived from the contents of `source`: pixel data routinely contains
    /// embedded zero bytes. Returns the number of bytes written.
    pub fn write_bytes(&self, source: &[u8]) -> usize {
        let count = cmp::min(self.mapping.size, source.len());
        // Safe because the mapping covers `count` bytes and the ranges cannot
        // overlap (the mapping was created by this process from a fresh mmap).
        unsafe {
            ptr::copy_nonoverlapping(source.as_ptr(), self.mapping.addr as *mut u8, count);
        }
        count
    }

    /// Copies from the mapping into `dest`, clamped to the mapping size. Returns the
    /// number of bytes read.
    pub fn read_bytes(&self, dest: &mut [u8]) -> usize {
        let count = cmp::min(self.mapping.size, dest.len());
        // Safe for the same reason as `write_bytes`.
        unsafe {
            ptr::copy_nonoverlapping(self.mapping.addr as *const u8, dest.as_mut_ptr(), count);
        }
        count
    }
}
