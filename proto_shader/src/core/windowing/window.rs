/// Window trait definitions
///
/// This file provides the traits that should be provided by any platform-specific
/// windowing implementation. See [crate::core::platform::winit_window] for the
/// winit + glutin one.
use log::{error, info};
use thiserror::Error;

use proto_shader::core::utils::handle::Handle;

pub type SurfaceHandle = Handle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The window system could not produce a window or its GL surface
    #[error("could not create surface '{title}': {reason}")]
    Creation { title: String, reason: String },
}

/// Window and context owner the render loop presents through.
///
/// One context may own several surfaces. The render loop calls
/// [GraphicsContext::make_current] before drawing into each of them.
pub trait GraphicsContext {
    fn create_surface(
        &mut self,
        window_builder: &WindowBuilder,
    ) -> Result<SurfaceHandle, SurfaceError>;

    fn make_current(&mut self, surface: SurfaceHandle);

    /// Process pending window system events. This is where close requests
    /// (window close button, escape key) are picked up.
    fn poll_events(&mut self);

    /// Swap the back buffer of `surface`
    fn present_surface(&mut self, surface: SurfaceHandle);

    fn should_close(&self, surface: SurfaceHandle) -> bool;

    /// Seconds since this context was created
    fn elapsed_time(&self) -> f32;

    fn destroy_surface(&mut self, surface: SurfaceHandle);
}

impl<C: GraphicsContext + ?Sized> GraphicsContext for &mut C {
    fn create_surface(
        &mut self,
        window_builder: &WindowBuilder,
    ) -> Result<SurfaceHandle, SurfaceError> {
        (**self).create_surface(window_builder)
    }

    fn make_current(&mut self, surface: SurfaceHandle) {
        (**self).make_current(surface)
    }

    fn poll_events(&mut self) {
        (**self).poll_events()
    }

    fn present_surface(&mut self, surface: SurfaceHandle) {
        (**self).present_surface(surface)
    }

    fn should_close(&self, surface: SurfaceHandle) -> bool {
        (**self).should_close(surface)
    }

    fn elapsed_time(&self) -> f32 {
        (**self).elapsed_time()
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) {
        (**self).destroy_surface(surface)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowBuilder {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl WindowBuilder {
    pub fn new() -> Self {
        WindowBuilder {
            title: "Proto Shader".to_owned(),
            height: 480,
            width: 640,
            vsync: true,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create one surface per builder, in order.
///
/// If any creation fails the surfaces created so far are destroyed again and
/// the error is returned: there is nothing to render into.
pub fn create_surfaces<C: GraphicsContext>(
    context: &mut C,
    window_builders: &[WindowBuilder],
) -> Result<Vec<SurfaceHandle>, SurfaceError> {
    let mut surfaces = Vec::with_capacity(window_builders.len());
    for window_builder in window_builders {
        match context.create_surface(window_builder) {
            Ok(surface) => {
                info!(
                    "Created surface '{}' ({}x{})",
                    window_builder.title, window_builder.width, window_builder.height
                );
                surfaces.push(surface);
            }
            Err(err) => {
                error!("{}", err);
                for surface in surfaces {
                    context.destroy_surface(surface);
                }
                return Err(err);
            }
        }
    }
    Ok(surfaces)
}
