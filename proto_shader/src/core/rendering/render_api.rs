use glam::Vec4;

use proto_shader::core::rendering::shader::ShaderStage;
use proto_shader::core::rendering::vertex_array::VertexSource;
use proto_shader::core::utils::handle::Handle;

pub type ShaderHandle = Handle;
pub type ProgramHandle = Handle;
pub type VertexArrayHandle = Handle;

/// Result of a driver step that can be rejected, like compiling or linking.
/// `info_log` holds whatever the driver had to say, which may be non-empty
/// even on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub success: bool,
    pub info_log: String,
}

impl StatusReport {
    pub fn ok() -> Self {
        StatusReport {
            success: true,
            info_log: String::new(),
        }
    }

    pub fn failed(info_log: impl Into<String>) -> Self {
        StatusReport {
            success: false,
            info_log: info_log.into(),
        }
    }
}

/// This is the behaviour that a graphics driver should implement,
/// translating the platform-specific details of the API to this trait.
///
/// Resources are referenced through generational handles. Passing a handle
/// that was already deleted is a contract violation and implementations
/// should panic on it instead of touching driver state.
pub trait GraphicsDriver {
    // Shader stages
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle, String>;
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> StatusReport;
    fn delete_shader(&mut self, shader: ShaderHandle);

    // Programs
    fn create_program(&mut self) -> Result<ProgramHandle, String>;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&mut self, program: ProgramHandle) -> StatusReport;
    fn delete_program(&mut self, program: ProgramHandle);

    // Uniforms
    /// Location of an active uniform, `None` when the program has no uniform
    /// with that name (including declared uniforms the compiler removed).
    fn get_uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn use_program(&mut self, program: Option<ProgramHandle>);
    fn uniform_4_f32(&mut self, location: u32, value: Vec4);

    // Frame
    fn clear(&mut self, color: Vec4);
    fn draw_arrays(&mut self, source: &VertexSource);
    fn delete_vertex_source(&mut self, source: VertexSource);
}

/// Lets an owner lend its driver to a render loop and keep it afterwards
impl<D: GraphicsDriver + ?Sized> GraphicsDriver for &mut D {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        (**self).create_shader(stage)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> StatusReport {
        (**self).compile_shader(shader, source)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        (**self).delete_shader(shader)
    }

    fn create_program(&mut self) -> Result<ProgramHandle, String> {
        (**self).create_program()
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        (**self).attach_shader(program, shader)
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        (**self).detach_shader(program, shader)
    }

    fn link_program(&mut self, program: ProgramHandle) -> StatusReport {
        (**self).link_program(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        (**self).delete_program(program)
    }

    fn get_uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32> {
        (**self).get_uniform_location(program, name)
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        (**self).use_program(program)
    }

    fn uniform_4_f32(&mut self, location: u32, value: Vec4) {
        (**self).uniform_4_f32(location, value)
    }

    fn clear(&mut self, color: Vec4) {
        (**self).clear(color)
    }

    fn draw_arrays(&mut self, source: &VertexSource) {
        (**self).draw_arrays(source)
    }

    fn delete_vertex_source(&mut self, source: VertexSource) {
        (**self).delete_vertex_source(source)
    }
}
