use std::collections::HashMap;

use glam::Vec4;
use log::{debug, error, trace};

use proto_shader::core::rendering::render_api::{GraphicsDriver, ProgramHandle};
use proto_shader::core::rendering::shader::{ShaderError, ShaderStage, ShaderUnit};

/// Location of a uniform inside a linked program.
///
/// [UniformHandle::INVALID] stands for "the program has no such uniform".
/// That happens for misspelled names, but also for uniforms that are declared
/// and never used, since the compiler strips those. Writing through the
/// invalid handle does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(i32);

impl UniformHandle {
    pub const INVALID: UniformHandle = UniformHandle(-1);

    pub fn from_location(location: Option<u32>) -> Self {
        match location.and_then(|location| i32::try_from(location).ok()) {
            Some(location) => UniformHandle(location),
            None => UniformHandle::INVALID,
        }
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    pub fn location(&self) -> Option<u32> {
        u32::try_from(self.0).ok()
    }
}

/// Which program is bound for the following draw and uniform calls.
///
/// Drivers keep exactly one active program per context. This value mirrors
/// that state so it can be checked (and tested) without asking the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActiveProgramContext {
    current: Option<ProgramHandle>,
}

impl ActiveProgramContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ProgramHandle> {
        self.current
    }

    pub fn is_active(&self, program: ProgramHandle) -> bool {
        self.current == Some(program)
    }

    fn activate(&mut self, program: ProgramHandle) {
        self.current = Some(program);
    }

    fn deactivate(&mut self, program: ProgramHandle) {
        if self.is_active(program) {
            self.current = None;
        }
    }
}

/// Vertex and fragment source text for one program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// A vertex and a fragment stage linked into one pipeline
pub struct ShaderProgram {
    native_program: Option<ProgramHandle>,
    linked: bool,
    diagnostic_log: String,
    uniform_cache: HashMap<String, UniformHandle>,
}

impl ShaderProgram {
    /// Link two compiled units. Both units are detached and deleted whatever
    /// the link result is.
    ///
    /// Panics if a unit is not compiled or targets the wrong stage.
    pub fn build<D: GraphicsDriver>(
        driver: &mut D,
        mut vertex: ShaderUnit,
        mut fragment: ShaderUnit,
    ) -> ShaderProgram {
        assert!(
            vertex.stage() == ShaderStage::Vertex && fragment.stage() == ShaderStage::Fragment,
            "A program is built from a vertex unit and a fragment unit, got {} and {}",
            vertex.stage(),
            fragment.stage()
        );
        assert!(
            vertex.is_compiled() && fragment.is_compiled(),
            "Trying to link shader units that did not compile"
        );

        let stages = [vertex.take_native(), fragment.take_native()];
        let program = match driver.create_program() {
            Ok(program) => program,
            Err(message) => {
                error!("Could not create shader program: {}", message);
                for shader in stages.into_iter().flatten() {
                    driver.delete_shader(shader);
                }
                return ShaderProgram::unlinked(
                    None,
                    format!("could not create program object: {message}"),
                );
            }
        };

        for shader in stages.iter().flatten() {
            driver.attach_shader(program, *shader);
        }

        let report = driver.link_program(program);

        // Units are no longer needed once link was attempted, the program keeps what it needs
        for shader in stages.into_iter().flatten() {
            driver.detach_shader(program, shader);
            driver.delete_shader(shader);
        }

        if !report.success {
            let log = if report.info_log.trim().is_empty() {
                "program linking failed without diagnostics".to_owned()
            } else {
                report.info_log
            };
            error!("Error linking program: {}", log);
            return ShaderProgram::unlinked(Some(program), log);
        }

        debug!("Shader program {:?} linked", program);
        ShaderProgram {
            native_program: Some(program),
            linked: true,
            diagnostic_log: String::new(),
            uniform_cache: HashMap::new(),
        }
    }

    /// Compile both stages and link them. Any failure is returned with its
    /// full diagnostic and every driver object created on the way is freed.
    pub fn from_sources<D: GraphicsDriver>(
        driver: &mut D,
        sources: ShaderSources<'_>,
    ) -> Result<ShaderProgram, ShaderError> {
        let vertex = ShaderUnit::compile(driver, ShaderStage::Vertex, sources.vertex);
        let fragment = ShaderUnit::compile(driver, ShaderStage::Fragment, sources.fragment);

        if let Err(err) = vertex.check().and_then(|_| fragment.check()) {
            vertex.release(driver);
            fragment.release(driver);
            return Err(err);
        }

        let program = ShaderProgram::build(driver, vertex, fragment);
        if let Err(err) = program.check() {
            program.destroy(driver);
            return Err(err);
        }
        Ok(program)
    }

    fn unlinked(native_program: Option<ProgramHandle>, diagnostic_log: String) -> Self {
        ShaderProgram {
            native_program,
            linked: false,
            diagnostic_log,
            uniform_cache: HashMap::new(),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn diagnostic_log(&self) -> &str {
        &self.diagnostic_log
    }

    /// Driver handle of this program, `None` if the driver never created one
    pub fn native_program(&self) -> Option<ProgramHandle> {
        self.native_program
    }

    /// `Ok` for a linked program, the link diagnostics otherwise
    pub fn check(&self) -> Result<(), ShaderError> {
        if self.linked {
            Ok(())
        } else {
            Err(ShaderError::LinkFailure {
                log: self.diagnostic_log.clone(),
            })
        }
    }

    /// Make this program the active one
    pub fn use_program<D: GraphicsDriver>(
        &self,
        active: &mut ActiveProgramContext,
        driver: &mut D,
    ) {
        let program = self.linked_program();
        driver.use_program(Some(program));
        active.activate(program);
    }

    /// Look up a uniform by name. Only the first lookup of each name reaches
    /// the driver, misses included.
    pub fn resolve_uniform<D: GraphicsDriver>(
        &mut self,
        driver: &mut D,
        name: &str,
    ) -> UniformHandle {
        if let Some(handle) = self.uniform_cache.get(name) {
            return *handle;
        }

        let program = self.linked_program();
        let handle = UniformHandle::from_location(driver.get_uniform_location(program, name));
        if !handle.is_valid() {
            debug!(
                "Uniform '{}' is not active in program {:?}. Was it declared but never used?",
                name, program
            );
        }
        self.uniform_cache.insert(name.to_owned(), handle);
        handle
    }

    /// Write a `vec4` uniform. This program must be the active one; an invalid
    /// handle makes this a no-op.
    pub fn set_uniform_vec4<D: GraphicsDriver>(
        &self,
        active: &ActiveProgramContext,
        driver: &mut D,
        handle: UniformHandle,
        value: Vec4,
    ) {
        let program = self.linked_program();
        assert!(
            active.is_active(program),
            "Setting a uniform on program {:?} while it is not the active program",
            program
        );

        let Some(location) = handle.location() else {
            return;
        };
        trace!("uniform {} <- {}", location, value);
        driver.uniform_4_f32(location, value);
    }

    /// Release the driver program
    pub fn destroy<D: GraphicsDriver>(self, driver: &mut D) {
        if let Some(program) = self.native_program {
            driver.delete_program(program);
        }
    }

    /// Same as [ShaderProgram::destroy], keeping `active` in sync
    pub fn destroy_active<D: GraphicsDriver>(
        self,
        active: &mut ActiveProgramContext,
        driver: &mut D,
    ) {
        if let Some(program) = self.native_program {
            if active.is_active(program) {
                driver.use_program(None);
                active.deactivate(program);
            }
        }
        self.destroy(driver);
    }

    fn linked_program(&self) -> ProgramHandle {
        match (self.linked, self.native_program) {
            (true, Some(program)) => program,
            _ => panic!("Trying to use a shader program that did not link"),
        }
    }
}
