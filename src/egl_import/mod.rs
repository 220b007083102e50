// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! This module implements the consuming half of the zero-copy pipeline: a
//! PRIME descriptor becomes a driver image, the image becomes an external
//! texture, and a sample pass draws it.

mod bridge;
mod extensions;
mod sphere;

pub use bridge::ExternalTexture;
pub use bridge::ImageDescription;
pub use bridge::ImportBridge;
pub use bridge::ImportedImage;
pub use bridge::PlaneDescription;
pub use bridge::RenderProgram;
pub use extensions::ImageExtensions;
pub use extensions::RawEglDisplay;
pub use extensions::RawEglImage;
pub use sphere::SphereMesh;
pub use sphere::SPHERE_SLICES;
