// Copyright 2025 The Primebuf Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! bridge: turns an exported dumb buffer into a GPU-sampleable external
//! texture and drives a minimal render pass against it.
//!
//! All GPU state (program, mesh, per-frame image and texture) is owned here;
//! nothing lives in process-wide variables. A frame walks Idle → ProgramReady
//! → ImageImported → TextureBound → Drawn → Released; any failure jumps
//! straight to Released through the drop of `FrameResources`.

use std::ffi::CString;
use std::mem;
use std::os::raw::c_void;
use std::ptr;

use gl::types::GLchar;
use gl::types::GLenum;
use gl::types::GLfloat;
use gl::types::GLint;
use gl::types::GLsizei;
use gl::types::GLuint;
use khronos_egl as egl;
use log::error;

use crate::dumb_buffer::canonical_image_layout;
use crate::dumb_buffer::DrmFormat;
use crate::dumb_buffer::DumbBuffer;
use crate::egl_import::extensions::ImageExtensions;
use crate::egl_import::extensions::RawEglDisplay;
use crate::egl_import::extensions::RawEglImage;
use crate::egl_import::sphere::SphereMesh;
use crate::egl_import::sphere::SPHERE_SLICES;
use crate::primebuf_os::AsRawDescriptor;
use crate::primebuf_os::RawDescriptor;
use crate::primebuf_utils::PrimebufError;
use crate::primebuf_utils::PrimebufResult;

/* EGL_EXT_image_dma_buf_import and GL_OES_EGL_image_external tokens. */
const EGL_LINUX_DMA_BUF_EXT: egl::Enum = 0x3270;
const EGL_LINUX_DRM_FOURCC_EXT: egl::Int = 0x3271;
const EGL_DMA_BUF_PLANE0_FD_EXT: egl::Int = 0x3272;
const EGL_DMA_BUF_PLANE0_OFFSET_EXT: egl::Int = 0x3273;
const EGL_DMA_BUF_PLANE0_PITCH_EXT: egl::Int = 0x3274;
const EGL_DMA_BUF_PLANE1_FD_EXT: egl::Int = 0x3275;
const EGL_DMA_BUF_PLANE1_OFFSET_EXT: egl::Int = 0x3276;
const EGL_DMA_BUF_PLANE1_PITCH_EXT: egl::Int = 0x3277;

const TEXTURE_EXTERNAL_OES: GLenum = 0x8d65;

static VERTEX_SHADER: &str = "attribute vec3 position;\n\
    attribute vec2 texCoords;\n\
    uniform mat4 uMvp;\n\
    varying vec2 outTexCoords;\n\
    void main(void) {\n\
        outTexCoords = texCoords.xy;\n\
        gl_Position = uMvp * vec4(position, 1.0);\n\
        gl_Position = gl_Position.xyzz;\n\
    }\n";

static FRAGMENT_SHADER: &str = "#extension GL_OES_EGL_image_external : require\n\
    precision mediump float;\n\
    varying vec2 outTexCoords;\n\
    uniform samplerExternalOES texture;\n\
    void main(void) {\n\
        gl_FragColor = texture2D(texture, outTexCoords);\n\
    }\n";

/// Column-major projection used by the sample draw.
static PROJECTION: [GLfloat; 16] = [
    167.81992,
    0.0,
    0.0,
    0.0,
    0.0,
    167.81992,
    0.0,
    0.0,
    0.0,
    0.0,
    -202.01006,
    -200.0,
    0.025592538,
    0.0,
    -1.0050251,
    0.0,
];

/// One plane of a dma-buf image: the shared descriptor, the byte offset of the
/// plane within it, and the row pitch.
#[derive(Copy, Clone, Debug)]
pub struct PlaneDescription {
    pub fd: RawDescriptor,
    pub offset: u32,
    pub pitch: u32,
}

/// Everything the driver needs to interpret an exported buffer as an image.
#[derive(Clone, Debug)]
pub struct ImageDescription {
    pub format: DrmFormat,
    pub width: u32,
    pub height: u32,
    pub planes: Vec<PlaneDescription>,
}

impl ImageDescription {
    /// Describes `buffer` as a two-plane NV12 image: the full-resolution luma
    /// plane at offset 0, the interleaved chroma plane immediately after it,
    /// both with a row pitch of `width`.
    pub fn nv12(buffer: &DumbBuffer) -> PrimebufResult<ImageDescription> {
        let fd = buffer
            .prime_fd()
            .ok_or(PrimebufError::NotExported)?
            .as_raw_descriptor();

        let format = DrmFormat::new(b'N', b'V', b'1', b'2');
        let layout = canonical_image_layout(format, buffer.width(), buffer.height())?;

        Ok(ImageDescription {
            format,
            width: buffer.width(),
            height: buffer.height(),
            planes: (0..layout.num_planes)
                .map(|plane| PlaneDescription {
                    fd,
                    offset: layout.offsets[plane],
                    pitch: layout.strides[plane],
                })
                .collect(),
        })
    }

    /// Rejects plane lists that disagree with the canonical layout for the
    /// format. The layout contract is part of the API: a wrong chroma offset
    /// would otherwise only show up as visibly wrong sampling.
    pub fn validate(&self) -> PrimebufResult<()> {
        let layout = canonical_image_layout(self.format, self.width, self.height)?;
        if self.planes.len() != layout.num_planes {
            return Err(PrimebufError::InvalidPlaneLayout("plane count mismatch"));
        }

        for (plane, description) in self.planes.iter().enumerate() {
            if description.fd < 0 {
                return Err(PrimebufError::InvalidPlaneLayout("negative plane fd"));
            }
            if description.offset != layout.offsets[plane] {
                return Err(PrimebufError::InvalidPlaneLayout(
                    "plane offset disagrees with canonical layout",
                ));
            }
            if description.pitch != layout.strides[plane] {
                return Err(PrimebufError::InvalidPlaneLayout(
                    "plane pitch disagrees with canonical layout",
                ));
            }
        }

        Ok(())
    }
}

fn dma_buf_attributes(description: &ImageDescription) -> Vec<egl::Int> {
    const PLANE_TOKENS: [[egl::Int; 3]; 2] = [
        [
            EGL_DMA_BUF_PLANE0_FD_EXT,
            EGL_DMA_BUF_PLANE0_OFFSET_EXT,
            EGL_DMA_BUF_PLANE0_PITCH_EXT,
        ],
        [
            EGL_DMA_BUF_PLANE1_FD_EXT,
            EGL_DMA_BUF_PLANE1_OFFSET_EXT,
            EGL_DMA_BUF_PLANE1_PITCH_EXT,
        ],
    ];

    let mut attrs = vec![
        EGL_LINUX_DRM_FOURCC_EXT,
        description.format.0 as egl::Int,
        egl::WIDTH,
        description.width as egl::Int,
        egl::HEIGHT,
        description.height as egl::Int,
    ];

    for (plane, plane_description) in description.planes.iter().enumerate() {
        attrs.push(PLANE_TOKENS[plane][0]);
        attrs.push(plane_description.fd as egl::Int);
        attrs.push(PLANE_TOKENS[plane][1]);
        attrs.push(plane_description.offset as egl::Int);
        attrs.push(PLANE_TOKENS[plane][2]);
        attrs.push(plane_description.pitch as egl::Int);
    }

    attrs.push(egl::NONE);
    attrs
}

/// A driver image created from a dma-buf description, destroyed on drop.
pub struct ImportedImage<'a> {
    image: RawEglImage,
    display: RawEglDisplay,
    extensions: &'a ImageExtensions,
}

impl ImportedImage<'_> {
    pub fn as_ptr(&self) -> RawEglImage {
        self.image
    }
}

impl Drop for ImportedImage<'_> {
    fn drop(&mut self) {
        // Safe because the image was created on this display by the same table.
        unsafe {
            (self.extensions.destroy_image)(self.display, self.image);
        }
    }
}

/// Creates a driver image from a validated description. Import is
/// context-independent: images are display-scoped, so EGL_NO_CONTEXT is passed.
fn import_with_display<'a>(
    extensions: &'a ImageExtensions,
    display: RawEglDisplay,
    description: &ImageDescription,
) -> PrimebufResult<ImportedImage<'a>> {
    description.validate()?;

    let attrs = dma_buf_attributes(description);

    // Safe because the attribute list is terminated and outlives the call.
    let image = unsafe {
        (extensions.create_image)(
            display,
            ptr::null_mut(),
            EGL_LINUX_DMA_BUF_EXT,
            ptr::null_mut(),
            attrs.as_ptr(),
        )
    };

    if image.is_null() {
        let code = unsafe { (extensions.get_error)() };
        error!("eglCreateImageKHR failed, egl error 0x{:x}", code);
        return Err(PrimebufError::ImageImportError(code));
    }

    Ok(ImportedImage {
        image,
        display,
        extensions,
    })
}

/// A GL texture name bound to the external-sampler target, deleted on drop.
pub struct ExternalTexture {
    id: GLuint,
}

impl ExternalTexture {
    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for ExternalTexture {
    fn drop(&mut self) {
        // Safe because the name was generated on the current context.
        unsafe {
            gl::DeleteTextures(1, &self.id);
        }
    }
}

/// A linked program with its resolved attribute and uniform locations,
/// deleted on drop.
pub struct RenderProgram {
    id: GLuint,
    position: GLint,
    tex_coords: GLint,
    sampler: GLint,
    mvp: GLint,
}

impl Drop for RenderProgram {
    fn drop(&mut self) {
        // Safe because the program was linked on the current context.
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

fn shader_info_log(shader: GLuint) -> String {
    let mut len: GLint = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
    }
    if len <= 0 {
        return String::new();
    }

    let mut log = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    unsafe {
        gl::GetShaderInfoLog(shader, len, &mut written, log.as_mut_ptr() as *mut GLchar);
    }
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

fn program_info_log(program: GLuint) -> String {
    let mut len: GLint = 0;
    unsafe {
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    }
    if len <= 0 {
        return String::new();
    }

    let mut log = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    unsafe {
        gl::GetProgramInfoLog(program, len, &mut written, log.as_mut_ptr() as *mut GLchar);
    }
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

fn load_shader(shader_type: GLenum, source: &str) -> PrimebufResult<GLuint> {
    let c_source = CString::new(source)?;

    unsafe {
        let shader = gl::CreateShader(shader_type);
        if shader == 0 {
            return Err(PrimebufError::ShaderCompileError(
                "glCreateShader returned no shader".to_string(),
            ));
        }

        gl::ShaderSource(shader, 1, &c_source.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut compiled: GLint = 0;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut compiled);
        if compiled == 0 {
            let log = shader_info_log(shader);
            gl::DeleteShader(shader);
            error!("could not compile shader {}: {}", shader_type, log);
            return Err(PrimebufError::ShaderCompileError(log));
        }

        Ok(shader)
    }
}

fn create_program(vertex_source: &str, fragment_source: &str) -> PrimebufResult<GLuint> {
    let vertex_shader = load_shader(gl::VERTEX_SHADER, vertex_source)?;
    let fragment_shader = load_shader(gl::FRAGMENT_SHADER, fragment_source);

    let fragment_shader = match fragment_shader {
        Ok(shader) => shader,
        Err(e) => {
            unsafe {
                gl::DeleteShader(vertex_shader);
            }
            return Err(e);
        }
    };

    unsafe {
        let program = gl::CreateProgram();
        if program == 0 {
            gl::DeleteShader(vertex_shader);
            gl::DeleteShader(fragment_shader);
            return Err(PrimebufError::ShaderLinkError(
                "glCreateProgram returned no program".to_string(),
            ));
        }

        gl::AttachShader(program, vertex_shader);
        gl::AttachShader(program, fragment_shader);
        gl::LinkProgram(program);

        // The shaders are owned by the program from here on.
        gl::DeleteShader(vertex_shader);
        gl::DeleteShader(fragment_shader);

        let mut linked: GLint = 0;
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut linked);
        if linked != gl::TRUE as GLint {
            let log = program_info_log(program);
            gl::DeleteProgram(program);
            error!("could not link program: {}", log);
            return Err(PrimebufError::ShaderLinkError(log));
        }

        Ok(program)
    }
}

/// Per-frame GPU resources. The field order is load-bearing: dropping this
/// struct releases the texture, then the program, then the imported image,
/// on success and failure paths alike.
#[derive(Default)]
struct FrameResources<'a> {
    texture: Option<ExternalTexture>,
    program: Option<RenderProgram>,
    image: Option<ImportedImage<'a>>,
}

/// Materializes GPU textures from exported dumb buffers and draws a sample
/// pass against them.
///
/// Operations must run on the thread owning the current GPU context; every
/// call blocks until the driver responds. The capability table and the EGL
/// instance are owned by the embedder's device context and borrowed here.
pub struct ImportBridge<'a> {
    egl: &'a egl::DynamicInstance<egl::EGL1_4>,
    extensions: &'a ImageExtensions,
    mesh: Option<SphereMesh>,
}

impl<'a> ImportBridge<'a> {
    pub fn new(
        egl: &'a egl::DynamicInstance<egl::EGL1_4>,
        extensions: &'a ImageExtensions,
    ) -> ImportBridge<'a> {
        ImportBridge {
            egl,
            extensions,
            mesh: None,
        }
    }

    fn current_display(&self) -> PrimebufResult<RawEglDisplay> {
        self.egl
            .get_current_display()
            .map(|display| display.as_ptr())
            .ok_or(PrimebufError::SpecViolation("no current EGL display"))
    }

    /// Builds the test geometry (once) and compiles/links the sample program.
    /// The returned program is the caller's to release; dropping a previous
    /// program before rebuilding is the caller's single line of bookkeeping.
    pub fn setup_render_state(&mut self) -> PrimebufResult<RenderProgram> {
        if self.mesh.is_none() {
            self.mesh = Some(SphereMesh::new(SPHERE_SLICES, 1.0)?);
        }

        let id = create_program(VERTEX_SHADER, FRAGMENT_SHADER)?;

        // Safe because the program is linked; location queries have no
        // preconditions beyond that.
        unsafe {
            Ok(RenderProgram {
                id,
                position: gl::GetAttribLocation(id, b"position\0".as_ptr() as *const GLchar),
                tex_coords: gl::GetAttribLocation(id, b"texCoords\0".as_ptr() as *const GLchar),
                sampler: gl::GetUniformLocation(id, b"texture\0".as_ptr() as *const GLchar),
                mvp: gl::GetUniformLocation(id, b"uMvp\0".as_ptr() as *const GLchar),
            })
        }
    }

    /// Imports `buffer` as a two-plane NV12 image on the current display.
    pub fn import_image(&self, buffer: &DumbBuffer) -> PrimebufResult<ImportedImage<'a>> {
        self.import_described(&ImageDescription::nv12(buffer)?)
    }

    /// Imports an explicit image description, after validating it against the
    /// canonical layout for its format.
    pub fn import_described(
        &self,
        description: &ImageDescription,
    ) -> PrimebufResult<ImportedImage<'a>> {
        let display = self.current_display()?;
        import_with_display(self.extensions, display, description)
    }

    /// Binds `image` as the level-zero content of a fresh external texture.
    pub fn bind_texture(&self, image: &ImportedImage) -> PrimebufResult<ExternalTexture> {
        unsafe {
            let mut id: GLuint = 0;
            gl::GenTextures(1, &mut id);

            // The guard exists before the error check so a failed bind still
            // deletes the name.
            let texture = ExternalTexture { id };

            gl::BindTexture(TEXTURE_EXTERNAL_OES, texture.id());
            (self.extensions.image_target_texture)(TEXTURE_EXTERNAL_OES, image.as_ptr());

            let gl_error = gl::GetError();
            if gl_error != gl::NO_ERROR {
                error!(
                    "glEGLImageTargetTexture2DOES failed, gl error 0x{:x}",
                    gl_error
                );
                return Err(PrimebufError::TextureBindError(gl_error));
            }

            gl::TexParameteri(
                TEXTURE_EXTERNAL_OES,
                gl::TEXTURE_MIN_FILTER,
                gl::LINEAR as GLint,
            );
            gl::TexParameteri(
                TEXTURE_EXTERNAL_OES,
                gl::TEXTURE_MAG_FILTER,
                gl::LINEAR as GLint,
            );

            Ok(texture)
        }
    }

    /// Draws the full sphere mesh sampling `texture`.
    pub fn draw_sample(
        &self,
        program: &RenderProgram,
        texture: &ExternalTexture,
    ) -> PrimebufResult<()> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or(PrimebufError::SpecViolation("render state not set up"))?;

        // Safe because the program and texture are alive and the attribute
        // arrays outlive the draw.
        unsafe {
            gl::UseProgram(program.id);
            gl::Uniform1i(program.sampler, 0);
            gl::UniformMatrix4fv(program.mvp, 1, gl::FALSE, PROJECTION.as_ptr());
            gl::BindTexture(TEXTURE_EXTERNAL_OES, texture.id());

            gl::VertexAttribPointer(
                program.position as GLuint,
                3,
                gl::FLOAT,
                gl::FALSE,
                3 * mem::size_of::<GLfloat>() as GLsizei,
                mesh.vertices().as_ptr() as *const c_void,
            );
            gl::EnableVertexAttribArray(program.position as GLuint);

            gl::VertexAttribPointer(
                program.tex_coords as GLuint,
                2,
                gl::FLOAT,
                gl::FALSE,
                2 * mem::size_of::<GLfloat>() as GLsizei,
                mesh.texcoords().as_ptr() as *const c_void,
            );
            gl::EnableVertexAttribArray(program.tex_coords as GLuint);

            gl::DrawElements(
                gl::TRIANGLES,
                mesh.index_count() as GLsizei,
                gl::UNSIGNED_SHORT,
                mesh.indices().as_ptr() as *const c_void,
            );
        }

        Ok(())
    }

    /// Runs one complete frame against `buffer`: program build, image import,
    /// texture bind, draw. Every exit path releases the texture, the program
    /// and the image, in that order.
    pub fn run_one_frame(&mut self, buffer: &DumbBuffer) -> PrimebufResult<()> {
        let mut frame = FrameResources::default();
        let result = self.advance(buffer, &mut frame);
        drop(frame);
        result
    }

    fn advance(
        &mut self,
        buffer: &DumbBuffer,
        frame: &mut FrameResources<'a>,
    ) -> PrimebufResult<()> {
        let program = frame.program.insert(self.setup_render_state()?);
        let image = frame.image.insert(self.import_image(buffer)?);
        let texture = frame.texture.insert(self.bind_texture(image)?);
        self.draw_sample(program, texture)
    }

    /// Releases the mesh arrays, for process-wide teardown. Frame resources
    /// never outlive their frame, so there is nothing else to drop.
    pub fn shutdown(&mut self) {
        self.mesh = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::egl_import::extensions::RawEglClientBuffer;
    use crate::egl_import::extensions::RawEglContext;

    unsafe extern "system" fn mock_target(_target: GLenum, _image: *mut c_void) {}

    unsafe extern "system" fn mock_get_error() -> egl::Int {
        // EGL_BAD_ALLOC
        0x3003
    }

    // Tests run concurrently, so each test that counts driver calls brings its
    // own counters and entry points.
    macro_rules! counting_table {
        ($created:ident, $destroyed:ident, $table:ident, $image:expr) => {
            static $created: AtomicUsize = AtomicUsize::new(0);
            static $destroyed: AtomicUsize = AtomicUsize::new(0);

            fn $table() -> ImageExtensions {
                unsafe extern "system" fn create(
                    _display: RawEglDisplay,
                    _context: RawEglContext,
                    _target: egl::Enum,
                    _buffer: RawEglClientBuffer,
                    _attrs: *const egl::Int,
                ) -> RawEglImage {
                    let image: RawEglImage = $image;
                    if !image.is_null() {
                        $created.fetch_add(1, Ordering::SeqCst);
                    }
                    image
                }

                unsafe extern "system" fn destroy(
                    _display: RawEglDisplay,
                    _image: RawEglImage,
                ) -> egl::Boolean {
                    $destroyed.fetch_add(1, Ordering::SeqCst);
                    1
                }

                ImageExtensions::from_parts(create, destroy, mock_target, mock_get_error)
            }
        };
    }

    fn nv12_description(width: u32, height: u32) -> ImageDescription {
        ImageDescription {
            format: DrmFormat::new(b'N', b'V', b'1', b'2'),
            width,
            height,
            planes: vec![
                PlaneDescription {
                    fd: 1,
                    offset: 0,
                    pitch: width,
                },
                PlaneDescription {
                    fd: 1,
                    offset: width * height,
                    pitch: width,
                },
            ],
        }
    }

    #[test]
    fn plane_layout_contract() {
        nv12_description(64, 64).validate().unwrap();

        // A chroma plane anywhere but right after the luma plane is rejected.
        let mut shifted = nv12_description(64, 64);
        shifted.planes[1].offset = 64 * 64 + 64;
        assert!(matches!(
            shifted.validate(),
            Err(PrimebufError::InvalidPlaneLayout(_))
        ));

        let mut wrong_pitch = nv12_description(64, 64);
        wrong_pitch.planes[0].pitch = 128;
        assert!(wrong_pitch.validate().is_err());

        let mut missing_plane = nv12_description(64, 64);
        missing_plane.planes.pop();
        assert!(missing_plane.validate().is_err());

        let mut bad_fd = nv12_description(64, 64);
        bad_fd.planes[0].fd = -1;
        assert!(bad_fd.validate().is_err());
    }

    #[test]
    fn attribute_list_layout() {
        let attrs = dma_buf_attributes(&nv12_description(64, 32));

        assert_eq!(attrs[0], EGL_LINUX_DRM_FOURCC_EXT);
        assert_eq!(attrs[1] as u32, DrmFormat::new(b'N', b'V', b'1', b'2').0);
        assert_eq!(*attrs.last().unwrap(), egl::NONE);

        // Plane 1 offset token is followed by width * height.
        let offset_token = attrs
            .iter()
            .position(|a| *a == EGL_DMA_BUF_PLANE1_OFFSET_EXT)
            .unwrap();
        assert_eq!(attrs[offset_token + 1], 64 * 32);
    }

    #[test]
    fn image_released_on_drop() {
        counting_table!(CREATED, DESTROYED, table, 0x1 as RawEglImage);
        let extensions = table();

        let image =
            import_with_display(&extensions, ptr::null_mut(), &nv12_description(64, 64)).unwrap();

        let mut frame = FrameResources::default();
        frame.image = Some(image);
        drop(frame);

        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeated_imports_do_not_accumulate() {
        counting_table!(CREATED, DESTROYED, table, 0x1 as RawEglImage);
        let extensions = table();

        for _ in 0..4 {
            let image =
                import_with_display(&extensions, ptr::null_mut(), &nv12_description(64, 64))
                    .unwrap();
            drop(image);
        }

        assert_eq!(CREATED.load(Ordering::SeqCst), 4);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failed_import_creates_nothing() {
        counting_table!(CREATED, DESTROYED, table, ptr::null_mut());
        let extensions = table();

        let result = import_with_display(&extensions, ptr::null_mut(), &nv12_description(64, 64));

        assert!(matches!(
            result,
            Err(PrimebufError::ImageImportError(0x3003))
        ));
        assert_eq!(CREATED.load(Ordering::SeqCst), 0);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_description_never_reaches_driver() {
        counting_table!(CREATED, DESTROYED, table, 0x1 as RawEglImage);
        let extensions = table();

        let mut shifted = nv12_description(64, 64);
        shifted.planes[1].offset = 1;
        assert!(import_with_display(&extensions, ptr::null_mut(), &shifted).is_err());

        assert_eq!(CREATED.load(Ordering::SeqCst), 0);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 0);
    }
}
