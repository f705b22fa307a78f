use std::fmt;

use log::error;
use thiserror::Error;

use proto_shader::core::rendering::render_api::{GraphicsDriver, ShaderHandle};

/// Programmable pipeline stages a [ShaderUnit] can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The driver compiler rejected the source of one stage
    #[error("failed to compile {stage} shader:\n{log}")]
    CompileFailure { stage: ShaderStage, log: String },
    /// Both stages compiled but the driver refused to link them together
    #[error("failed to link shader program:\n{log}")]
    LinkFailure { log: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Pending,
    Compiled,
    Failed,
}

/// One shader stage compiled from source text.
///
/// A unit is compiled exactly once. Failing to compile is an ordinary outcome
/// reported through [ShaderUnit::status] and [ShaderUnit::diagnostic_log]; use
/// [ShaderUnit::check] to turn it into a [ShaderError].
///
/// A compiled unit is meant to be consumed by
/// [ShaderProgram::build](proto_shader::core::rendering::program::ShaderProgram::build),
/// which frees its driver object. Units that never get that far must be
/// handed back with [ShaderUnit::release].
#[derive(Debug)]
pub struct ShaderUnit {
    stage: ShaderStage,
    source: String,
    status: UnitStatus,
    diagnostic_log: String,
    native_shader: Option<ShaderHandle>,
}

impl ShaderUnit {
    pub fn new(stage: ShaderStage, source: impl Into<String>) -> Self {
        ShaderUnit {
            stage,
            source: source.into(),
            status: UnitStatus::Pending,
            diagnostic_log: String::new(),
            native_shader: None,
        }
    }

    /// Create a unit for `stage` and compile it right away
    pub fn compile<D: GraphicsDriver>(
        driver: &mut D,
        stage: ShaderStage,
        source: impl Into<String>,
    ) -> Self {
        let mut unit = ShaderUnit::new(stage, source);
        unit.compile_with(driver);
        unit
    }

    /// Submit the source to the driver compiler. Panics if this unit was
    /// already compiled.
    pub fn compile_with<D: GraphicsDriver>(&mut self, driver: &mut D) -> UnitStatus {
        assert!(
            self.status == UnitStatus::Pending,
            "Shader unit ({} stage) compiled twice",
            self.stage
        );

        let shader = match driver.create_shader(self.stage) {
            Ok(shader) => shader,
            Err(message) => {
                self.fail(format!("could not create {} shader object: {}", self.stage, message));
                return self.status;
            }
        };
        self.native_shader = Some(shader);

        let report = driver.compile_shader(shader, &self.source);
        if report.success {
            self.status = UnitStatus::Compiled;
            self.diagnostic_log.clear();
        } else {
            // Drivers don't always say something useful, a failed unit always carries a log
            let log = if report.info_log.trim().is_empty() {
                format!("{} shader compilation failed without diagnostics", self.stage)
            } else {
                report.info_log
            };
            self.fail(log);
        }

        self.status
    }

    fn fail(&mut self, log: String) {
        error!("Error compiling {} shader: {}", self.stage, log);
        self.status = UnitStatus::Failed;
        self.diagnostic_log = log;
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    pub fn is_compiled(&self) -> bool {
        self.status == UnitStatus::Compiled
    }

    pub fn diagnostic_log(&self) -> &str {
        &self.diagnostic_log
    }

    /// `Ok` for a compiled unit, the compile diagnostics otherwise
    pub fn check(&self) -> Result<(), ShaderError> {
        match self.status {
            UnitStatus::Compiled => Ok(()),
            UnitStatus::Failed => Err(ShaderError::CompileFailure {
                stage: self.stage,
                log: self.diagnostic_log.clone(),
            }),
            UnitStatus::Pending => {
                panic!("Checking a {} shader that was never compiled", self.stage)
            }
        }
    }

    /// Free the driver object of a unit that won't be linked
    pub fn release<D: GraphicsDriver>(mut self, driver: &mut D) {
        if let Some(shader) = self.native_shader.take() {
            driver.delete_shader(shader);
        }
    }

    /// Hand the driver object over to the program being linked
    pub(crate) fn take_native(&mut self) -> Option<ShaderHandle> {
        self.native_shader.take()
    }
}
