/// Winit + glutin implementation of the graphics context.
///
/// Every window gets its own GL surface, but all of them share one GL
/// context, so shader programs and vertex arrays created once are usable
/// from every surface.
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    PossiblyCurrentGlContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use log::{debug, error, warn};
use raw_window_handle::HasRawWindowHandle;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as winit_Window, WindowBuilder as winit_WindowBuilder, WindowId};

use proto_shader::core::platform::opengl::opengl_render_backend::GlowDriver;
use proto_shader::core::utils::handle::Allocator;
use proto_shader::core::windowing::{GraphicsContext, SurfaceError, SurfaceHandle, WindowBuilder};

struct WinitSurface {
    window: winit_Window,
    surface: Surface<WindowSurface>,
    title: String,
    should_close: bool,
}

pub struct WinitGraphicsContext {
    event_loop: EventLoop<()>,
    // Both are created along with the first window
    gl_config: Option<Config>,
    context: Option<PossiblyCurrentContext>,
    surfaces: Allocator<WinitSurface>,
    window_to_surface: HashMap<WindowId, SurfaceHandle>,
    start: Instant,
}

impl WinitGraphicsContext {
    pub fn new() -> Result<Self, SurfaceError> {
        let event_loop = EventLoop::new().map_err(|err| SurfaceError::Creation {
            title: String::new(),
            reason: format!("could not build winit event loop: {err}"),
        })?;

        Ok(WinitGraphicsContext {
            event_loop,
            gl_config: None,
            context: None,
            surfaces: Allocator::new(),
            window_to_surface: HashMap::new(),
            start: Instant::now(),
        })
    }

    /// Load a glow driver from the shared GL context. Needs at least one
    /// surface to exist.
    pub fn create_driver(&self) -> Result<GlowDriver, SurfaceError> {
        let (Some(gl_config), Some(_)) = (&self.gl_config, &self.context) else {
            return Err(SurfaceError::Creation {
                title: String::new(),
                reason: "no GL context yet, create a surface first".to_owned(),
            });
        };
        let display = gl_config.display();
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s).cast())
        };
        Ok(GlowDriver::new(gl))
    }

    fn build_window(
        &mut self,
        window_builder: &WindowBuilder,
    ) -> Result<(winit_Window, Config), String> {
        let winit_builder = winit_WindowBuilder::new()
            .with_title(window_builder.title.clone())
            .with_inner_size(LogicalSize::new(window_builder.width, window_builder.height))
            .with_decorations(true);

        if let Some(gl_config) = &self.gl_config {
            let window = glutin_winit::finalize_window(&self.event_loop, winit_builder, gl_config)
                .map_err(|err| err.to_string())?;
            return Ok((window, gl_config.clone()));
        }

        // First window: the GL config is picked along with it
        let (window, gl_config) = glutin_winit::DisplayBuilder::new()
            .with_window_builder(Some(winit_builder))
            .build(&self.event_loop, ConfigTemplateBuilder::new(), |configs| {
                configs
                    .reduce(|best, config| {
                        if config.num_samples() > best.num_samples() {
                            config
                        } else {
                            best
                        }
                    })
                    .expect("The display should offer at least one GL config")
            })
            .map_err(|err| err.to_string())?;
        let window = window.ok_or_else(|| "display builder returned no window".to_owned())?;
        Ok((window, gl_config))
    }

    fn surface(&self, handle: SurfaceHandle) -> &WinitSurface {
        self.surfaces
            .get(handle)
            .unwrap_or_else(|| panic!("Trying to use dead surface handle {:?}", handle))
    }

    fn try_create_surface(
        &mut self,
        window_builder: &WindowBuilder,
    ) -> Result<SurfaceHandle, String> {
        let width =
            NonZeroU32::new(window_builder.width).ok_or("window width must not be zero")?;
        let height =
            NonZeroU32::new(window_builder.height).ok_or("window height must not be zero")?;

        let (window, gl_config) = self.build_window(window_builder)?;
        let raw_window_handle = window.raw_window_handle();

        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new()
            .with_srgb(Some(true))
            .build(raw_window_handle, width, height);
        let surface = unsafe {
            gl_config
                .display()
                .create_window_surface(&gl_config, &surface_attrs)
                .map_err(|err| format!("failed to create OpenGL surface for window: {err}"))?
        };

        let context = match &self.context {
            Some(context) => {
                context
                    .make_current(&surface)
                    .map_err(|err| format!("could not make the GL context current: {err}"))?;
                None
            }
            None => {
                let context_attrs = ContextAttributesBuilder::new()
                    .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
                    .with_profile(GlProfile::Core)
                    .with_debug(cfg!(debug_assertions))
                    .build(Some(raw_window_handle));
                let not_current = unsafe {
                    gl_config
                        .display()
                        .create_context(&gl_config, &context_attrs)
                        .map_err(|err| format!("failed to create OpenGL context: {err}"))?
                };
                Some(
                    not_current
                        .make_current(&surface)
                        .map_err(|err| format!("could not make the GL context current: {err}"))?,
                )
            }
        };
        if let Some(context) = context {
            self.context = Some(context);
        }
        self.gl_config = Some(gl_config);

        let interval = if window_builder.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Some(context) = &self.context {
            if let Err(err) = surface.set_swap_interval(context, interval) {
                warn!("Could not set swap interval for '{}': {}", window_builder.title, err);
            }
        }

        let window_id = window.id();
        let handle = self.surfaces.allocate(WinitSurface {
            window,
            surface,
            title: window_builder.title.clone(),
            should_close: false,
        });
        self.window_to_surface.insert(window_id, handle);
        Ok(handle)
    }
}

impl GraphicsContext for WinitGraphicsContext {
    fn create_surface(
        &mut self,
        window_builder: &WindowBuilder,
    ) -> Result<SurfaceHandle, SurfaceError> {
        self.try_create_surface(window_builder)
            .map_err(|reason| SurfaceError::Creation {
                title: window_builder.title.clone(),
                reason,
            })
    }

    fn make_current(&mut self, surface: SurfaceHandle) {
        let winit_surface = self.surface(surface);
        let Some(context) = &self.context else {
            return;
        };
        if let Err(err) = context.make_current(&winit_surface.surface) {
            error!("Could not make surface '{}' current: {}", winit_surface.title, err);
        }
    }

    fn poll_events(&mut self) {
        let WinitGraphicsContext {
            event_loop,
            context,
            surfaces,
            window_to_surface,
            ..
        } = self;

        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _event_loop| {
            let Event::WindowEvent { window_id, event } = event else {
                return;
            };
            let Some(winit_surface) = window_to_surface
                .get(&window_id)
                .and_then(|handle| surfaces.get_mut(*handle))
            else {
                return;
            };

            match event {
                WindowEvent::CloseRequested => winit_surface.should_close = true,
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed
                        && event.logical_key == Key::Named(NamedKey::Escape) =>
                {
                    winit_surface.should_close = true
                }
                WindowEvent::Resized(size) => {
                    if let (Some(context), Some(width), Some(height)) = (
                        context.as_ref(),
                        NonZeroU32::new(size.width),
                        NonZeroU32::new(size.height),
                    ) {
                        winit_surface.surface.resize(context, width, height);
                    }
                }
                _ => {}
            }
        });

        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}, closing every surface", code);
            for handle in window_to_surface.values() {
                if let Some(winit_surface) = surfaces.get_mut(*handle) {
                    winit_surface.should_close = true;
                }
            }
        }
    }

    fn present_surface(&mut self, surface: SurfaceHandle) {
        let winit_surface = self.surface(surface);
        let Some(context) = &self.context else {
            return;
        };
        winit_surface.window.request_redraw();
        if let Err(err) = winit_surface.surface.swap_buffers(context) {
            error!("Error swapping buffers of '{}': {}", winit_surface.title, err);
        }
    }

    fn should_close(&self, surface: SurfaceHandle) -> bool {
        self.surface(surface).should_close
    }

    fn elapsed_time(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) {
        let winit_surface = self
            .surfaces
            .free(surface)
            .unwrap_or_else(|| panic!("Trying to destroy dead surface handle {:?}", surface));
        self.window_to_surface.remove(&winit_surface.window.id());
        debug!("Destroyed surface '{}'", winit_surface.title);
    }
}
