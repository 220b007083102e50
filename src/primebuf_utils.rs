// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! primebuf_utils: Utility enums, structs, and implementations needed by the rest of the crate.

use std::ffi::NulError;
use std::io::Error as IoError;
use std::num::TryFromIntError;

#[cfg(unix)]
use nix::Error as NixError;
use remain::sorted;
use thiserror::Error;

/// An error generated while using this crate.
#[sorted]
#[derive(Error, Debug)]
pub enum PrimebufError {
    /// The device file descriptor handed to the allocator was never initialized.
    #[error("buffer allocation failed: {0}")]
    AllocationError(&'static str),
    /// A dumb buffer may be exported exactly once.
    #[error("buffer was already exported")]
    AlreadyExported,
    /// Checked Arithmetic error
    #[error("arithmetic failed: {}({}) {op} {}({})", .field1.0, .field1.1, .field2.0, .field2.1)]
    CheckedArithmetic {
        field1: (&'static str, usize),
        field2: (&'static str, usize),
        op: &'static str,
    },
    /// Checked Range error
    #[error("range check failed: {}({}) vs {}({})", .field1.0, .field1.1, .field2.0, .field2.1)]
    CheckedRange {
        field1: (&'static str, usize),
        field2: (&'static str, usize),
    },
    /// The driver rejected the destroy-dumb request.
    #[error("destroy-dumb request rejected by the driver, errno {0}")]
    DestroyError(i32),
    /// The driver rejected the prime handle-to-fd request.
    #[error("prime handle-to-fd request rejected by the driver, errno {0}")]
    ExportError(i32),
    /// The EGL image creation entry point returned no image.
    #[error("image import rejected by the driver, egl error 0x{0:x}")]
    ImageImportError(i32),
    /// A plane list disagrees with the canonical layout for its format.
    #[error("invalid plane layout: {0}")]
    InvalidPlaneLayout(&'static str),
    /// An input/output error occured.
    #[error("an input/output error occur: {0}")]
    IoError(IoError),
    /// A kernel ioctl was rejected by the driver.
    #[error("kernel request {op} rejected by the driver, errno {errno}")]
    KernelRequestError { op: &'static str, errno: i32 },
    /// The memory map of a dumb buffer failed.
    #[error("mapping the buffer failed, errno {0}")]
    MappingError(i32),
    /// A required EGL/GL extension entry point could not be resolved.
    #[error("missing extension entry point: {0}")]
    MissingExtension(&'static str),
    /// Nix crate error.
    #[cfg(unix)]
    #[error("the errno is {0}")]
    NixError(NixError),
    /// The buffer has no exported file descriptor.
    #[error("buffer was never exported")]
    NotExported,
    #[error("nul error occured {0}")]
    NulError(NulError),
    /// A shader failed to compile; carries the driver info log.
    #[error("shader compilation failed: {0}")]
    ShaderCompileError(String),
    /// A program failed to link; carries the driver info log.
    #[error("program link failed: {0}")]
    ShaderLinkError(String),
    /// Violation of the primebuf spec occured.
    #[error("violation of the primebuf spec: {0}")]
    SpecViolation(&'static str),
    /// The GPU reported an error right after the image-to-texture bind.
    #[error("external texture bind failed, gl error 0x{0:x}")]
    TextureBindError(u32),
    /// An attempted integer conversion failed.
    #[error("int conversion failed: {0}")]
    TryFromIntError(TryFromIntError),
    /// The command is unsupported.
    #[error("the requested function is not implemented")]
    Unsupported,
}

#[cfg(unix)]
impl From<NixError> for PrimebufError {
    fn from(e: NixError) -> PrimebufError {
        PrimebufError::NixError(e)
    }
}

impl From<NulError> for PrimebufError {
    fn from(e: NulError) -> PrimebufError {
        PrimebufError::NulError(e)
    }
}

impl From<IoError> for PrimebufError {
    fn from(e: IoError) -> PrimebufError {
        PrimebufError::IoError(e)
    }
}

impl From<TryFromIntError> for PrimebufError {
    fn from(e: TryFromIntError) -> PrimebufError {
        PrimebufError::TryFromIntError(e)
    }
}

/// The result of an operation in this crate.
pub type PrimebufResult<T> = std::result::Result<T, PrimebufError>;

/// Access flags for CPU mappings of a buffer.
pub const PRIMEBUF_MAP_ACCESS_MASK: u32 = 0xf0;
pub const PRIMEBUF_MAP_ACCESS_READ: u32 = 0x10;
pub const PRIMEBUF_MAP_ACCESS_WRITE: u32 = 0x20;
pub const PRIMEBUF_MAP_ACCESS_RW: u32 = 0x30;
