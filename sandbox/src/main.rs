use anyhow::Context;
use log::{error, info};
use proto_shader::core::rendering::default_shaders::{TRIANGLE_VERTICES, UNIFORM_COLOR};
use proto_shader::prelude::*;

/// How many windows to open when `PROTO_SHADER_WINDOWS` is not set
const DEFAULT_WINDOWS: usize = 1;

fn window_count() -> anyhow::Result<usize> {
    match std::env::var("PROTO_SHADER_WINDOWS") {
        Ok(value) => {
            let count: usize = value
                .parse()
                .with_context(|| format!("PROTO_SHADER_WINDOWS must be a number, got '{value}'"))?;
            anyhow::ensure!(count > 0, "PROTO_SHADER_WINDOWS must be at least 1");
            Ok(count)
        }
        Err(_) => Ok(DEFAULT_WINDOWS),
    }
}

fn run() -> anyhow::Result<LoopReport> {
    let window_builders: Vec<WindowBuilder> = (0..window_count()?)
        .map(|i| WindowBuilder::new().with_title(format!("Proto Shader {i}")))
        .collect();

    let mut context = WinitGraphicsContext::new()?;
    let surfaces = create_surfaces(&mut context, &window_builders)?;
    let mut driver = context.create_driver()?;

    let vertex_source = driver
        .create_vertex_source(&TRIANGLE_VERTICES)
        .map_err(anyhow::Error::msg)
        .context("could not upload the triangle")?;
    let program = ShaderProgram::from_sources(&mut driver, UNIFORM_COLOR)?;

    let render_loop = RenderLoop::new(
        context,
        driver,
        program,
        vertex_source,
        surfaces,
        LoopConfig::default(),
    )?;
    Ok(render_loop.run())
}

fn main() {
    // Keep window system chatter out unless RUST_LOG asks for it
    let logging = LoggingConfig::new().with_fallback_filter("warn,sandbox=info,proto_shader=info");
    init_logging(&logging);

    match run() {
        Ok(report) => info!(
            "Done after {} iteration(s), frames per window: {:?}",
            report.iterations, report.frames_presented
        ),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    }
}
