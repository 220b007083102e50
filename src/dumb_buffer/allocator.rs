// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! allocator: allocates kernel dumb buffers, fills them from the CPU and
//! exports them as PRIME file descriptors.
//!
//! The kernel handle and the exported descriptor are two independent
//! resources: destroying the handle does not close the descriptor and closing
//! the descriptor does not free the handle. `DumbBuffer` keeps them as two
//! explicit fields and `release` retires both.

use log::error;
use nix::ioctl_readwrite;
use zerocopy::AsBytes;
use zerocopy::FromBytes;

use crate::dumb_buffer::rendernode::DRM_IOCTL_BASE;
use crate::primebuf_os::AsRawDescriptor;
use crate::primebuf_os::Descriptor;
use crate::primebuf_os::FromRawDescriptor;
use crate::primebuf_os::MemoryMapping;
use crate::primebuf_os::RawDescriptor;
use crate::primebuf_os::SafeDescriptor;
use crate::primebuf_utils::*;

const DRM_IOCTL_PRIME_HANDLE_TO_FD: u32 = 0x2d;
const DRM_IOCTL_MODE_CREATE_DUMB: u32 = 0xb2;
const DRM_IOCTL_MODE_MAP_DUMB: u32 = 0xb3;
const DRM_IOCTL_MODE_DESTROY_DUMB: u32 = 0xb4;

/* Kernel ABI structs from include/uapi/drm/drm_mode.h and drm.h. */

#[repr(C)]
#[derive(Copy, Clone, Default, AsBytes, FromBytes)]
struct drm_mode_create_dumb {
    height: u32,
    width: u32,
    bpp: u32,
    flags: u32,
    handle: u32,
    pitch: u32,
    size: u64,
}

#[repr(C)]
#[derive(Copy, Clone, Default, AsBytes, FromBytes)]
struct drm_mode_map_dumb {
    handle: u32,
    pad: u32,
    offset: u64,
}

#[repr(C)]
#[derive(Copy, Clone, Default, AsBytes, FromBytes)]
struct drm_mode_destroy_dumb {
    handle: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Default, AsBytes, FromBytes)]
struct drm_prime_handle {
    handle: u32,
    flags: u32,
    fd: i32,
}

ioctl_readwrite!(
    drm_mode_create_dumb_ioctl,
    DRM_IOCTL_BASE,
    DRM_IOCTL_MODE_CREATE_DUMB,
    drm_mode_create_dumb
);

ioctl_readwrite!(
    drm_mode_map_dumb_ioctl,
    DRM_IOCTL_BASE,
    DRM_IOCTL_MODE_MAP_DUMB,
    drm_mode_map_dumb
);

ioctl_readwrite!(
    drm_mode_destroy_dumb_ioctl,
    DRM_IOCTL_BASE,
    DRM_IOCTL_MODE_DESTROY_DUMB,
    drm_mode_destroy_dumb
);

ioctl_readwrite!(
    drm_prime_handle_to_fd_ioctl,
    DRM_IOCTL_BASE,
    DRM_IOCTL_PRIME_HANDLE_TO_FD,
    drm_prime_handle
);

/// A kernel dumb buffer, possibly exported as a PRIME file descriptor.
///
/// `handle` stays allocated until a destroy request retires it; `prime_fd` is
/// owned by this struct and closed when it drops or when `release` consumes
/// the buffer. Neither release implies the other.
pub struct DumbBuffer {
    width: u32,
    height: u32,
    bpp: u32,
    handle: u32,
    pitch: u32,
    size: u64,
    map_offset: u64,
    prime_fd: Option<SafeDescriptor>,
}

impl DumbBuffer {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per pixel the buffer was allocated with.
    pub fn bpp(&self) -> u32 {
        self.bpp
    }

    /// Kernel handle of the underlying allocation, valid only on the owning device.
    pub fn handle(&self) -> u32 {
        self.handle
    }

    /// Row pitch in bytes, as reported by the kernel.
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Total allocation size in bytes, as reported by the kernel.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset into the device descriptor at which the buffer maps, as reported
    /// by the map-dumb request. Zero until the buffer has been filled.
    pub fn map_offset(&self) -> u64 {
        self.map_offset
    }

    /// The exported PRIME descriptor, present only after a successful export.
    pub fn prime_fd(&self) -> Option<&SafeDescriptor> {
        self.prime_fd.as_ref()
    }
}

/// Allocates, fills, exports and destroys dumb buffers on a DRM device.
///
/// The device descriptor is owned by the embedder; the allocator only reads
/// it and never closes it.
pub struct DumbBufferAllocator {
    device: Descriptor,
}

impl DumbBufferAllocator {
    /// Returns a new allocator over an already-opened DRM device descriptor.
    pub fn new(device: Descriptor) -> PrimebufResult<DumbBufferAllocator> {
        if device.as_raw_descriptor() < 0 {
            error!("device fd not initialized");
            return Err(PrimebufError::AllocationError(
                "device fd not initialized",
            ));
        }

        Ok(DumbBufferAllocator { device })
    }

    /// Allocates a `width` x `height` dumb buffer of `bpp` bits per pixel, copies
    /// `source` into it and exports it as a PRIME descriptor.
    ///
    /// The copy length is the kernel-reported buffer size clamped to
    /// `source.len()`; it is never derived from scanning the data, which may
    /// contain embedded zero bytes. A `source` shorter than the buffer leaves the
    /// tail kernel-zeroed.
    pub fn allocate(
        &self,
        width: u32,
        height: u32,
        bpp: u32,
        source: &[u8],
    ) -> PrimebufResult<DumbBuffer> {
        let mut buffer = self.create(width, height, bpp)?;

        let filled = self
            .fill(&mut buffer, source)
            .and_then(|_| self.export(&mut buffer).map(|_| ()));
        if let Err(e) = filled {
            // The handle would otherwise outlive this call with no owner.
            if let Err(destroy_err) = self.destroy(&mut buffer) {
                error!("destroy after failed allocate failed: {}", destroy_err);
            }
            return Err(e);
        }

        Ok(buffer)
    }

    /// Issues the create-dumb request and returns the resulting buffer, not yet
    /// filled or exported.
    fn create(&self, width: u32, height: u32, bpp: u32) -> PrimebufResult<DumbBuffer> {
        let mut create_arg = drm_mode_create_dumb::new_zeroed();
        create_arg.width = width;
        create_arg.height = height;
        create_arg.bpp = bpp;

        // Safe because the arg struct is a stack variable of the correct type and
        // the return value is checked.
        unsafe {
            drm_mode_create_dumb_ioctl(self.device.as_raw_descriptor(), &mut create_arg).map_err(
                |e| {
                    error!("failed to create dumb buffer: {}", e);
                    PrimebufError::KernelRequestError {
                        op: "DRM_IOCTL_MODE_CREATE_DUMB",
                        errno: e as i32,
                    }
                },
            )?;
        }

        Ok(DumbBuffer {
            width,
            height,
            bpp,
            handle: create_arg.handle,
            pitch: create_arg.pitch,
            size: create_arg.size,
            map_offset: 0,
            prime_fd: None,
        })
    }

    /// Maps the buffer through the device descriptor and copies `source` into it.
    fn fill(&self, buffer: &mut DumbBuffer, source: &[u8]) -> PrimebufResult<()> {
        let mut map_arg = drm_mode_map_dumb::new_zeroed();
        map_arg.handle = buffer.handle;

        // Safe because the arg struct is a stack variable of the correct type and
        // the return value is checked.
        unsafe {
            drm_mode_map_dumb_ioctl(self.device.as_raw_descriptor(), &mut map_arg).map_err(|e| {
                error!("failed to map dumb buffer: {}", e);
                PrimebufError::KernelRequestError {
                    op: "DRM_IOCTL_MODE_MAP_DUMB",
                    errno: e as i32,
                }
            })?;
        }
        buffer.map_offset = map_arg.offset;

        let size: usize = buffer.size.try_into()?;
        let mapping = MemoryMapping::from_offset(
            &self.device,
            buffer.map_offset,
            size,
            PRIMEBUF_MAP_ACCESS_RW,
        )?;
        mapping.write_bytes(source);

        // The mapping unmaps here; the copy is the only CPU access.
        Ok(())
    }

    /// Converts the kernel handle into a process-transferable PRIME descriptor
    /// and returns its raw value.
    ///
    /// The handle stays allocated and must still be destroyed separately; the
    /// descriptor itself is owned by the buffer.
    pub fn export(&self, buffer: &mut DumbBuffer) -> PrimebufResult<RawDescriptor> {
        if buffer.prime_fd.is_some() {
            return Err(PrimebufError::AlreadyExported);
        }

        let mut prime_arg = drm_prime_handle::new_zeroed();
        prime_arg.handle = buffer.handle;
        prime_arg.fd = -1;

        // Safe because the arg struct is a stack variable of the correct type and
        // the return value is checked.
        unsafe {
            drm_prime_handle_to_fd_ioctl(self.device.as_raw_descriptor(), &mut prime_arg).map_err(
                |e| {
                    error!("failed to export dumb buffer handle: {}", e);
                    PrimebufError::ExportError(e as i32)
                },
            )?;
        }

        if prime_arg.fd < 0 {
            error!("prime export returned an invalid fd");
            return Err(PrimebufError::ExportError(0));
        }

        // Safe because the kernel just handed this descriptor to us and nothing
        // else refers to it.
        buffer.prime_fd = Some(unsafe { SafeDescriptor::from_raw_descriptor(prime_arg.fd) });
        Ok(prime_arg.fd)
    }

    /// Issues the destroy-dumb request for the buffer's kernel handle.
    ///
    /// Does **not** close a previously exported PRIME descriptor; the descriptor
    /// owner closes it, or `release` retires both at once.
    pub fn destroy(&self, buffer: &mut DumbBuffer) -> PrimebufResult<()> {
        let mut destroy_arg = drm_mode_destroy_dumb::new_zeroed();
        destroy_arg.handle = buffer.handle;

        // Safe because the arg struct is a stack variable of the correct type and
        // the return value is checked.
        unsafe {
            drm_mode_destroy_dumb_ioctl(self.device.as_raw_descriptor(), &mut destroy_arg)
                .map_err(|e| {
                    error!("failed to destroy dumb buffer: {}", e);
                    PrimebufError::DestroyError(e as i32)
                })?;
        }

        buffer.handle = 0;
        Ok(())
    }

    /// Retires both of the buffer's resources: closes the exported descriptor,
    /// if any, then destroys the kernel handle.
    pub fn release(&self, mut buffer: DumbBuffer) -> PrimebufResult<()> {
        drop(buffer.prime_fd.take());
        self.destroy(&mut buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dumb_buffer::formats::solid_nv12;
    use crate::dumb_buffer::rendernode;
    use crate::primebuf_os::SharedMemory;

    #[test]
    fn copy_length_ignores_embedded_nul() {
        let shm = SharedMemory::new("primebuf_test", 4096).unwrap();
        let mapping = MemoryMapping::from_offset(&shm, 0, 4096, PRIMEBUF_MAP_ACCESS_RW).unwrap();

        // An embedded zero byte must not terminate the copy.
        let mut source = vec![0xabu8; 4096];
        source[7] = 0;

        assert_eq!(mapping.write_bytes(&source), 4096);

        let mut check = vec![0u8; 4096];
        assert_eq!(mapping.read_bytes(&mut check), 4096);
        assert_eq!(check[7], 0);
        assert!(check[8..].iter().all(|b| *b == 0xab));
    }

    #[test]
    fn copy_length_clamps_to_mapping() {
        let shm = SharedMemory::new("primebuf_test", 4096).unwrap();
        let mapping = MemoryMapping::from_offset(&shm, 0, 4096, PRIMEBUF_MAP_ACCESS_RW).unwrap();

        let source = vec![0x55u8; 8192];
        assert_eq!(mapping.write_bytes(&source), 4096);

        let short = vec![0x66u8; 16];
        assert_eq!(mapping.write_bytes(&short), 16);
    }

    #[test]
    fn invalid_device_rejected() {
        assert!(DumbBufferAllocator::new(Descriptor(-1)).is_err());
    }

    #[test]
    fn allocate_export_destroy() {
        // Skipped on machines without a dumb-buffer capable DRM device.
        let device = match rendernode::open_device(&["vgem"]) {
            Ok(device) => device,
            Err(_) => return,
        };

        let allocator = DumbBufferAllocator::new(Descriptor(device.as_raw_descriptor())).unwrap();
        let source = solid_nv12(64, 64, 0x80, 0x40, 0xc0).unwrap();

        let buffer = allocator.allocate(64, 64, 32, &source).unwrap();
        assert_eq!(buffer.width(), 64);
        assert_eq!(buffer.height(), 64);
        assert!(buffer.size() >= source.len() as u64);
        assert!(buffer.prime_fd().is_some());
        assert!(buffer.prime_fd().unwrap().as_raw_descriptor() >= 0);

        allocator.release(buffer).unwrap();
    }

    #[test]
    fn destroy_without_export() {
        let device = match rendernode::open_device(&["vgem"]) {
            Ok(device) => device,
            Err(_) => return,
        };

        let allocator = DumbBufferAllocator::new(Descriptor(device.as_raw_descriptor())).unwrap();
        let mut buffer = allocator.create(16, 16, 32).unwrap();

        assert!(buffer.prime_fd().is_none());
        allocator.destroy(&mut buffer).unwrap();
    }

    #[test]
    fn export_is_one_shot() {
        let device = match rendernode::open_device(&["vgem"]) {
            Ok(device) => device,
            Err(_) => return,
        };

        let allocator = DumbBufferAllocator::new(Descriptor(device.as_raw_descriptor())).unwrap();
        let source = solid_nv12(16, 16, 0, 0, 0).unwrap();
        let mut buffer = allocator.allocate(16, 16, 32, &source).unwrap();

        assert!(matches!(
            allocator.export(&mut buffer),
            Err(PrimebufError::AlreadyExported)
        ));

        allocator.release(buffer).unwrap();
    }
}
