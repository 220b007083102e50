// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! This module implements allocation of CPU-writable kernel dumb buffers and
//! their export as PRIME file descriptors, the producing half of the zero-copy
//! pipeline.

mod allocator;
mod formats;
pub mod rendernode;

pub use allocator::DumbBuffer;
pub use allocator::DumbBufferAllocator;
pub use formats::canonical_image_layout;
pub use formats::solid_nv12;
pub use formats::DrmFormat;
pub use formats::ImageLayout;
pub use formats::DRM_FORMAT_ARGB8888;
pub use formats::DRM_FORMAT_NV12;
pub use formats::DRM_FORMAT_XRGB8888;
