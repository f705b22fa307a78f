pub use crate::core::platform::opengl::opengl_render_backend::GlowDriver;
pub use crate::core::platform::winit_window::WinitGraphicsContext;
pub use crate::core::rendering::default_shaders;
pub use crate::core::rendering::program::{
    ActiveProgramContext, ShaderProgram, ShaderSources, UniformHandle,
};
pub use crate::core::rendering::render_api::GraphicsDriver;
pub use crate::core::rendering::render_loop::{
    LoopConfig, LoopError, LoopReport, LoopState, RenderLoop, RenderSurface,
};
pub use crate::core::rendering::shader::{ShaderError, ShaderStage, ShaderUnit, UnitStatus};
pub use crate::core::windowing::{create_surfaces, GraphicsContext, SurfaceError, WindowBuilder};
pub use crate::logging::{init_logging, LoggingConfig};
