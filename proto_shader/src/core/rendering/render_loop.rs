use glam::Vec4;
use log::{debug, error, info, trace};
use thiserror::Error;

use proto_shader::core::rendering::program::{ActiveProgramContext, ShaderProgram};
use proto_shader::core::rendering::render_api::GraphicsDriver;
use proto_shader::core::rendering::shader::ShaderError;
use proto_shader::core::rendering::vertex_array::VertexSource;
use proto_shader::core::time::Time;
use proto_shader::core::windowing::{GraphicsContext, SurfaceError, SurfaceHandle};

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("a render loop needs at least one surface")]
    NoSurfaces,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Per-loop settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Color every surface is cleared to before drawing
    pub clear_color: Vec4,
    /// Uniform that receives [oscillating_color] each frame
    pub uniform_name: String,
}

impl LoopConfig {
    pub fn new() -> Self {
        LoopConfig {
            clear_color: Vec4::new(0.2, 0.3, 0.3, 1.0),
            uniform_name: "ourColor".to_owned(),
        }
    }

    pub fn with_clear_color(mut self, clear_color: Vec4) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_uniform_name(mut self, uniform_name: String) -> Self {
        self.uniform_name = uniform_name;
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Color pushed to the shader at `elapsed_seconds`: green oscillating in `[0, 1]`
pub fn oscillating_color(elapsed_seconds: f32) -> Vec4 {
    let green = elapsed_seconds.sin() / 2.0 + 0.5;
    Vec4::new(0.0, green, 0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// A window the loop renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSurface {
    handle: SurfaceHandle,
    close_requested: bool,
    frames_presented: u64,
}

impl RenderSurface {
    pub fn new(handle: SurfaceHandle) -> Self {
        RenderSurface {
            handle,
            close_requested: false,
            frames_presented: 0,
        }
    }

    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Once requested, a close can't be taken back
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }
}

/// What a finished loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    /// Frames presented per surface, in creation order
    pub frames_presented: Vec<u64>,
}

/// Drives the frame cycle over every open surface with a single program.
///
/// Each [RenderLoop::step] updates the uniform, then clears, draws and
/// presents each open surface in creation order, then polls events. Once
/// every surface asked to close the loop is [LoopState::Terminated] and
/// stepping does nothing.
pub struct RenderLoop<C: GraphicsContext, D: GraphicsDriver> {
    context: C,
    driver: D,
    program: ShaderProgram,
    active_program: ActiveProgramContext,
    vertex_source: VertexSource,
    surfaces: Vec<RenderSurface>,
    time: Time,
    state: LoopState,
    iterations: u64,
    config: LoopConfig,
}

impl<C: GraphicsContext, D: GraphicsDriver> RenderLoop<C, D> {
    /// The program must be linked and there must be at least one surface.
    /// Surfaces are drawn in the order given here.
    ///
    /// On error every resource handed over is released, surfaces first, the
    /// same way [RenderLoop::shutdown] does.
    pub fn new(
        mut context: C,
        mut driver: D,
        program: ShaderProgram,
        vertex_source: VertexSource,
        surfaces: Vec<SurfaceHandle>,
        config: LoopConfig,
    ) -> Result<Self, LoopError> {
        let rejected = match program.check() {
            Err(err) => Some(LoopError::from(err)),
            Ok(()) if surfaces.is_empty() => Some(LoopError::NoSurfaces),
            Ok(()) => None,
        };
        if let Some(err) = rejected {
            error!("Could not start render loop: {}", err);
            for surface in surfaces {
                context.destroy_surface(surface);
            }
            program.destroy(&mut driver);
            driver.delete_vertex_source(vertex_source);
            return Err(err);
        }

        let time = Time::new(context.elapsed_time());
        Ok(RenderLoop {
            context,
            driver,
            program,
            active_program: ActiveProgramContext::new(),
            vertex_source,
            surfaces: surfaces.into_iter().map(RenderSurface::new).collect(),
            time,
            state: LoopState::Running,
            iterations: 0,
            config,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn surfaces(&self) -> &[RenderSurface] {
        &self.surfaces
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn active_program(&self) -> &ActiveProgramContext {
        &self.active_program
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Stop drawing the surface at `index` from the next iteration on
    pub fn request_close(&mut self, index: usize) {
        if let Some(surface) = self.surfaces.get_mut(index) {
            if !surface.close_requested {
                info!("Closing surface {} ({:?})", index, surface.handle);
            }
            surface.request_close();
        }
    }

    /// Step until every surface is closed, then release everything
    pub fn run(mut self) -> LoopReport {
        info!("Starting render loop with {} surface(s)", self.surfaces.len());
        while self.step() == LoopState::Running {}
        self.shutdown()
    }

    /// Run one iteration. Does nothing once terminated.
    pub fn step(&mut self) -> LoopState {
        if self.state == LoopState::Terminated {
            return self.state;
        }
        self.iterations += 1;

        // One clock reading per iteration
        self.time.step(self.context.elapsed_time());
        let color = oscillating_color(self.time.elapsed_seconds());
        trace!(
            "iteration {} at {:.3}s (dt {:.2}ms)",
            self.iterations,
            self.time.elapsed_seconds(),
            self.time.delta_milliseconds()
        );

        // Uniforms go first so every draw of this iteration sees them
        self.program.use_program(&mut self.active_program, &mut self.driver);
        let uniform = self
            .program
            .resolve_uniform(&mut self.driver, &self.config.uniform_name);
        self.program
            .set_uniform_vec4(&self.active_program, &mut self.driver, uniform, color);

        for surface in self.surfaces.iter_mut().filter(|surface| !surface.close_requested) {
            self.context.make_current(surface.handle);
            self.driver.clear(self.config.clear_color);
            self.driver.draw_arrays(&self.vertex_source);
            self.context.present_surface(surface.handle);
            surface.frames_presented += 1;
        }

        self.context.poll_events();
        for (index, surface) in self.surfaces.iter_mut().enumerate() {
            if !surface.close_requested && self.context.should_close(surface.handle) {
                info!("Surface {} ({:?}) requested close", index, surface.handle);
                surface.request_close();
            }
        }

        if self.surfaces.iter().all(RenderSurface::is_close_requested) {
            info!("All surfaces closed after {} iteration(s)", self.iterations);
            self.state = LoopState::Terminated;
        }
        self.state
    }

    /// Release surfaces in creation order, then the program and the vertex source
    pub fn shutdown(self) -> LoopReport {
        let RenderLoop {
            mut context,
            mut driver,
            program,
            mut active_program,
            vertex_source,
            surfaces,
            iterations,
            ..
        } = self;

        for surface in surfaces.iter() {
            debug!("Destroying surface {:?}", surface.handle);
            context.destroy_surface(surface.handle);
        }
        program.destroy_active(&mut active_program, &mut driver);
        driver.delete_vertex_source(vertex_source);

        LoopReport {
            iterations,
            frames_presented: surfaces.iter().map(RenderSurface::frames_presented).collect(),
        }
    }
}
