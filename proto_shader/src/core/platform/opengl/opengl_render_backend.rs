use glam::Vec4;
use glow::{Context, HasContext, NativeBuffer, NativeProgram, NativeShader, NativeVertexArray};
use log::{info, warn};

use proto_shader::core::rendering::render_api::{
    GraphicsDriver, ProgramHandle, ShaderHandle, StatusReport,
};
use proto_shader::core::rendering::shader::ShaderStage;
use proto_shader::core::rendering::vertex_array::{PrimitiveType, VertexSource};
use proto_shader::core::utils::handle::Allocator;

struct OpenGLVertexArray {
    native_array: NativeVertexArray,
    native_buffer: NativeBuffer,
}

/// OpenGL driver on top of glow.
///
/// The glow context is bound to the GL context that was current when it was
/// loaded, so this driver must live on the thread that owns that context.
pub struct OpenGLRenderBackend {
    gl: Context,
    shader_allocator: Allocator<NativeShader>,
    program_allocator: Allocator<NativeProgram>,
    vertex_array_allocator: Allocator<OpenGLVertexArray>,
}

pub type GlowDriver = OpenGLRenderBackend;

impl OpenGLRenderBackend {
    pub fn new(gl: Context) -> Self {
        let backend = OpenGLRenderBackend {
            gl,
            shader_allocator: Allocator::new(),
            program_allocator: Allocator::new(),
            vertex_array_allocator: Allocator::new(),
        };

        info!("Glow OpenGL successfully initialized!");
        info!("\tOpenGL Version: {}", backend.get_string(glow::VERSION));
        info!("\tOpenGL Renderer: {}", backend.get_string(glow::RENDERER));
        info!("\tOpenGL Vendor: {}", backend.get_string(glow::VENDOR));
        backend
    }

    /// Upload tightly packed `vec3` positions and describe them as attribute 0.
    /// The returned source draws them as triangles.
    pub fn create_vertex_source(&mut self, positions: &[f32]) -> Result<VertexSource, String> {
        const COMPONENTS: usize = 3;
        if positions.len() % COMPONENTS != 0 {
            return Err(format!(
                "vertex positions must come in groups of {COMPONENTS}, got {} floats",
                positions.len()
            ));
        }
        let vertex_count = u32::try_from(positions.len() / COMPONENTS)
            .map_err(|_| "too many vertices for a single draw".to_owned())?;

        let gl = &self.gl;
        let vertex_array = unsafe {
            let native_array = gl.create_vertex_array()?;
            let native_buffer = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(message) => {
                    gl.delete_vertex_array(native_array);
                    return Err(message);
                }
            };

            gl.bind_vertex_array(Some(native_array));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(native_buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(positions),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(
                0,
                COMPONENTS as i32,
                glow::FLOAT,
                false,
                (COMPONENTS * std::mem::size_of::<f32>()) as i32,
                0,
            );
            gl.enable_vertex_attrib_array(0);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            OpenGLVertexArray {
                native_array,
                native_buffer,
            }
        };

        let handle = self.vertex_array_allocator.allocate(vertex_array);
        Ok(VertexSource::new(handle, vertex_count, PrimitiveType::Triangles))
    }

    #[inline(always)]
    fn get_string(&self, variant: u32) -> String {
        unsafe { self.gl.get_parameter_string(variant) }
    }

    fn native_shader(&self, handle: ShaderHandle) -> NativeShader {
        *self
            .shader_allocator
            .get(handle)
            .unwrap_or_else(|| panic!("Trying to use dead shader handle {:?}", handle))
    }

    fn native_program(&self, handle: ProgramHandle) -> NativeProgram {
        *self
            .program_allocator
            .get(handle)
            .unwrap_or_else(|| panic!("Trying to use dead program handle {:?}", handle))
    }
}

impl GraphicsDriver for OpenGLRenderBackend {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        let shader = unsafe { self.gl.create_shader(shader_type)? };
        Ok(self.shader_allocator.allocate(shader))
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> StatusReport {
        let native_shader = self.native_shader(shader);
        unsafe {
            self.gl.shader_source(native_shader, source);
            self.gl.compile_shader(native_shader);

            // The info log may carry warnings even when compilation went ok
            let info_log = self.gl.get_shader_info_log(native_shader);
            StatusReport {
                success: self.gl.get_shader_compile_status(native_shader),
                info_log,
            }
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        let native_shader = self
            .shader_allocator
            .free(shader)
            .unwrap_or_else(|| panic!("Trying to delete dead shader handle {:?}", shader));
        unsafe { self.gl.delete_shader(native_shader) }
    }

    fn create_program(&mut self) -> Result<ProgramHandle, String> {
        let program = unsafe { self.gl.create_program()? };
        Ok(self.program_allocator.allocate(program))
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        let native_program = self.native_program(program);
        let native_shader = self.native_shader(shader);
        unsafe { self.gl.attach_shader(native_program, native_shader) }
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        let native_program = self.native_program(program);
        let native_shader = self.native_shader(shader);
        unsafe { self.gl.detach_shader(native_program, native_shader) }
    }

    fn link_program(&mut self, program: ProgramHandle) -> StatusReport {
        let native_program = self.native_program(program);
        unsafe {
            self.gl.link_program(native_program);
            let info_log = self.gl.get_program_info_log(native_program);
            StatusReport {
                success: self.gl.get_program_link_status(native_program),
                info_log,
            }
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        let native_program = self
            .program_allocator
            .free(program)
            .unwrap_or_else(|| panic!("Trying to delete dead program handle {:?}", program));
        unsafe { self.gl.delete_program(native_program) }
    }

    fn get_uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32> {
        let native_program = self.native_program(program);
        unsafe { self.gl.get_uniform_location(native_program, name) }.map(|location| location.0)
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        let native_program = program.map(|program| self.native_program(program));
        unsafe { self.gl.use_program(native_program) }
    }

    fn uniform_4_f32(&mut self, location: u32, value: Vec4) {
        let location = glow::NativeUniformLocation(location);
        unsafe {
            self.gl
                .uniform_4_f32(Some(&location), value.x, value.y, value.z, value.w);
        }
    }

    fn clear(&mut self, color: Vec4) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw_arrays(&mut self, source: &VertexSource) {
        let Some(vertex_array) = self.vertex_array_allocator.get(source.handle()) else {
            panic!("Trying to draw dead vertex source {:?}", source.handle());
        };
        let mode = match source.primitive() {
            PrimitiveType::Triangles => glow::TRIANGLES,
        };
        let Ok(count) = i32::try_from(source.vertex_count()) else {
            warn!("Skipping draw of {} vertices, too many for one call", source.vertex_count());
            return;
        };

        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array.native_array));
            self.gl.draw_arrays(mode, 0, count);
        }
    }

    fn delete_vertex_source(&mut self, source: VertexSource) {
        let vertex_array = self
            .vertex_array_allocator
            .free(source.handle())
            .unwrap_or_else(|| panic!("Trying to delete dead vertex source {:?}", source.handle()));
        unsafe {
            self.gl.delete_buffer(vertex_array.native_buffer);
            self.gl.delete_vertex_array(vertex_array.native_array);
        }
    }
}
