pub mod default_shaders;
pub mod program;
pub mod render_api;
pub mod render_loop;
pub mod shader;
pub mod vertex_array;
