pub mod opengl;
pub mod winit_window;
