// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A crate for zero-copy sharing of kernel dumb buffers with a GPU context.
//!
//! The pipeline has two halves. [`DumbBufferAllocator`] asks the kernel for a
//! dumb buffer, maps it for a single CPU fill, and exports it as a PRIME file
//! descriptor. [`ImportBridge`] turns that descriptor into a driver image on
//! the current display, binds it as an external texture and draws a sample
//! pass, releasing every GPU resource it created on success and failure paths
//! alike. The device descriptor and the current GPU context come from the
//! embedder; this crate never opens a display or creates a context.

#[macro_use]
mod macros;

mod dumb_buffer;
mod egl_import;
mod primebuf_os;
mod primebuf_utils;

pub use crate::dumb_buffer::canonical_image_layout;
pub use crate::dumb_buffer::rendernode;
pub use crate::dumb_buffer::solid_nv12;
pub use crate::dumb_buffer::DrmFormat;
pub use crate::dumb_buffer::DumbBuffer;
pub use crate::dumb_buffer::DumbBufferAllocator;
pub use crate::dumb_buffer::ImageLayout;
pub use crate::dumb_buffer::DRM_FORMAT_ARGB8888;
pub use crate::dumb_buffer::DRM_FORMAT_NV12;
pub use crate::dumb_buffer::DRM_FORMAT_XRGB8888;
pub use crate::egl_import::ExternalTexture;
pub use crate::egl_import::ImageDescription;
pub use crate::egl_import::ImageExtensions;
pub use crate::egl_import::ImportBridge;
pub use crate::egl_import::ImportedImage;
pub use crate::egl_import::PlaneDescription;
pub use crate::egl_import::RawEglDisplay;
pub use crate::egl_import::RawEglImage;
pub use crate::egl_import::RenderProgram;
pub use crate::egl_import::SphereMesh;
pub use crate::egl_import::SPHERE_SLICES;
pub use crate::primebuf_os::round_up_to_page_size;
pub use crate::primebuf_os::AsRawDescriptor;
pub use crate::primebuf_os::AsRawDescriptors;
pub use crate::primebuf_os::Descriptor;
pub use crate::primebuf_os::FromRawDescriptor as PrimebufFromRawDescriptor;
pub use crate::primebuf_os::IntoRawDescriptor as PrimebufIntoRawDescriptor;
pub use crate::primebuf_os::MemoryMapping;
pub use crate::primebuf_os::RawDescriptor;
pub use crate::primebuf_os::SafeDescriptor as PrimebufDescriptor;
pub use crate::primebuf_os::SharedMemory;
pub use crate::primebuf_utils::*;
