use glam::Vec4;

use crate::core::rendering::default_shaders::UNIFORM_COLOR;
use crate::core::rendering::program::{ShaderProgram, ShaderSources};
use crate::core::rendering::render_loop::{
    oscillating_color, LoopConfig, LoopError, LoopState, RenderLoop,
};
use crate::core::rendering::shader::{ShaderError, ShaderStage, ShaderUnit};
use crate::core::windowing::{create_surfaces, SurfaceError, SurfaceHandle, WindowBuilder};
use crate::tests::shared_fakes::{Call, FakeContext, FakeDriver, Journal};

struct Setup {
    journal: Journal,
    context: FakeContext,
    driver: FakeDriver,
    surfaces: Vec<SurfaceHandle>,
}

fn setup(surface_count: usize) -> Setup {
    let journal = Journal::default();
    let mut context = FakeContext::new(journal.clone());
    let driver = FakeDriver::new(journal.clone());
    let builders: Vec<WindowBuilder> = (0..surface_count)
        .map(|i| WindowBuilder::new().with_title(format!("window {i}")))
        .collect();
    let surfaces = create_surfaces(&mut context, &builders).unwrap();
    Setup {
        journal,
        context,
        driver,
        surfaces,
    }
}

fn render_loop(setup: Setup, sources: ShaderSources<'_>) -> RenderLoop<FakeContext, FakeDriver> {
    let Setup {
        context,
        mut driver,
        surfaces,
        ..
    } = setup;
    let program = ShaderProgram::from_sources(&mut driver, sources).unwrap();
    let vertex_source = driver.create_vertex_source(3);
    let config = LoopConfig::default();
    RenderLoop::new(context, driver, program, vertex_source, surfaces, config).unwrap()
}

/// Surfaces presented in one iteration, in presentation order
fn presented(iteration: &[Call]) -> Vec<SurfaceHandle> {
    iteration
        .iter()
        .filter_map(|call| match call {
            Call::Present(surface) => Some(*surface),
            _ => None,
        })
        .collect()
}

#[test]
fn test_two_surfaces_closing_at_different_times() {
    let mut setup = setup(2);
    let journal = setup.journal.clone();
    let (a, b) = (setup.surfaces[0], setup.surfaces[1]);
    setup.context.close_during_poll(a, 2);
    setup.context.close_during_poll(b, 7);

    let report = render_loop(setup, UNIFORM_COLOR).run();

    assert_eq!(report.iterations, 7);
    assert_eq!(report.frames_presented, vec![2, 7]);

    let iterations = journal.iterations();
    assert_eq!(iterations.len(), 7);
    for (i, iteration) in iterations.iter().enumerate() {
        let expected = if i < 2 { vec![a, b] } else { vec![b] };
        assert_eq!(presented(iteration), expected, "iteration {}", i + 1);
    }
}

#[test]
fn test_draw_order_follows_creation_order() {
    let schedules: [[u64; 3]; 6] = [
        [1, 2, 3],
        [1, 3, 2],
        [2, 1, 3],
        [2, 3, 1],
        [3, 1, 2],
        [3, 2, 1],
    ];

    for schedule in schedules {
        let mut setup = setup(3);
        let journal = setup.journal.clone();
        let surfaces = setup.surfaces.clone();
        for (surface, poll) in surfaces.iter().zip(schedule) {
            setup.context.close_during_poll(*surface, poll);
        }

        let report = render_loop(setup, UNIFORM_COLOR).run();
        assert_eq!(report.iterations, 3);

        for (i, iteration) in journal.iterations().iter().enumerate() {
            let iteration_number = i as u64 + 1;
            let expected: Vec<SurfaceHandle> = surfaces
                .iter()
                .zip(schedule)
                .filter(|(_, poll)| *poll >= iteration_number)
                .map(|(surface, _)| *surface)
                .collect();
            assert_eq!(presented(iteration), expected, "schedule {:?}", schedule);
        }
    }
}

#[test]
fn test_each_surface_is_cleared_drawn_and_presented() {
    let mut setup = setup(2);
    let journal = setup.journal.clone();
    let (a, b) = (setup.surfaces[0], setup.surfaces[1]);
    setup.context.close_during_poll(a, 1);
    setup.context.close_during_poll(b, 1);

    let mut render_loop = render_loop(setup, UNIFORM_COLOR);
    assert_eq!(render_loop.step(), LoopState::Terminated);

    let clear = Call::Clear(LoopConfig::default().clear_color);
    let frame: Vec<Call> = journal.iterations()[0]
        .iter()
        .filter(|call| {
            matches!(
                call,
                Call::MakeCurrent(_) | Call::Clear(_) | Call::Draw(..) | Call::Present(_)
            )
        })
        .cloned()
        .collect();
    let draw = |surface| {
        [
            Call::MakeCurrent(surface),
            clear.clone(),
            frame[2].clone(),
            Call::Present(surface),
        ]
    };
    assert!(matches!(frame[2], Call::Draw(_, 3)));
    assert_eq!(frame, [draw(a), draw(b)].concat());
}

#[test]
fn test_uniform_is_set_before_any_draw() {
    let mut setup = setup(2);
    let journal = setup.journal.clone();
    setup.context.close_during_poll(setup.surfaces[0], 3);
    setup.context.close_during_poll(setup.surfaces[1], 4);

    render_loop(setup, UNIFORM_COLOR).run();

    for iteration in journal.iterations() {
        let position = |predicate: fn(&Call) -> bool| iteration.iter().position(predicate).unwrap();
        let use_program = position(|call| matches!(call, Call::UseProgram(Some(_))));
        let uniform = position(|call| matches!(call, Call::Uniform4(..)));
        let first_draw = position(|call| matches!(call, Call::Draw(..)));
        assert!(use_program < uniform);
        assert!(uniform < first_draw);
    }
}

#[test]
fn test_uniform_follows_elapsed_time() {
    let mut setup = setup(1);
    let journal = setup.journal.clone();
    setup.context.seconds_per_poll = 0.5;
    setup.context.close_during_poll(setup.surfaces[0], 4);

    render_loop(setup, UNIFORM_COLOR).run();

    let pushed: Vec<Vec4> = journal
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Uniform4(_, value) => Some(value),
            _ => None,
        })
        .collect();
    // The clock is read once per iteration, before the poll that advances it
    let expected: Vec<Vec4> = [0.0, 0.5, 1.0, 1.5].into_iter().map(oscillating_color).collect();
    assert_eq!(pushed, expected);
}

#[test]
fn test_oscillating_color_stays_in_range() {
    assert_eq!(oscillating_color(0.0), Vec4::new(0.0, 0.5, 0.0, 1.0));
    assert_eq!(oscillating_color(2.5), oscillating_color(2.5));

    for step in 0..1000 {
        let color = oscillating_color(step as f32 * 0.037);
        assert!((0.0..=1.0).contains(&color.y));
        assert_eq!((color.x, color.z, color.w), (0.0, 0.0, 1.0));
    }
}

#[test]
fn test_unused_uniform_does_not_stop_the_loop() {
    let mut setup = setup(1);
    let journal = setup.journal.clone();
    setup.context.close_during_poll(setup.surfaces[0], 5);

    let sources = ShaderSources {
        vertex: UNIFORM_COLOR.vertex,
        fragment: "#version 330 core\n\
            out vec4 FragColor;\n\
            uniform vec4 ourColor;\n\
            void main()\n\
            {\n\
                FragColor = vec4(1.0);\n\
            }\n",
    };
    let report = render_loop(setup, sources).run();

    assert_eq!(report.frames_presented, vec![5]);
    assert_eq!(journal.count(|call| matches!(call, Call::Uniform4(..))), 0);
    assert_eq!(journal.count(|call| matches!(call, Call::Draw(..))), 5);
    assert_eq!(journal.count(|call| matches!(call, Call::UseProgram(Some(_)))), 5);
    // The miss is cached after the first iteration
    assert_eq!(journal.count(|call| matches!(call, Call::UniformQuery(_))), 1);
}

#[test]
fn test_close_request_is_monotonic() {
    let mut setup = setup(2);
    let journal = setup.journal.clone();
    let (a, b) = (setup.surfaces[0], setup.surfaces[1]);
    setup.context.close_during_poll(a, 1);
    setup.context.reopen_during_poll(a, 2);
    setup.context.close_during_poll(b, 3);

    let mut render_loop = render_loop(setup, UNIFORM_COLOR);
    while render_loop.step() == LoopState::Running {}

    assert!(render_loop.surfaces()[0].is_close_requested());
    assert_eq!(render_loop.surfaces()[0].frames_presented(), 1);
    assert_eq!(render_loop.iterations(), 3);

    // Terminated loops never resume
    let calls = journal.calls().len();
    assert_eq!(render_loop.step(), LoopState::Terminated);
    assert_eq!(render_loop.iterations(), 3);
    assert_eq!(journal.calls().len(), calls);
}

#[test]
fn test_closed_surfaces_stay_in_place() {
    let mut setup = setup(3);
    let surfaces = setup.surfaces.clone();
    setup.context.close_during_poll(surfaces[1], 1);
    setup.context.close_during_poll(surfaces[0], 2);
    setup.context.close_during_poll(surfaces[2], 2);

    let mut render_loop = render_loop(setup, UNIFORM_COLOR);
    render_loop.step();

    let handles: Vec<SurfaceHandle> = render_loop.surfaces().iter().map(|s| s.handle()).collect();
    assert_eq!(handles, surfaces);
    assert!(render_loop.surfaces()[1].is_close_requested());
    assert_eq!(render_loop.state(), LoopState::Running);
}

#[test]
fn test_loop_can_close_surfaces_itself() {
    let mut setup = setup(2);
    let journal = setup.journal.clone();
    let b = setup.surfaces[1];
    setup.context.close_during_poll(b, 2);

    let mut render_loop = render_loop(setup, UNIFORM_COLOR);
    render_loop.step();
    render_loop.request_close(0);
    render_loop.request_close(7);
    assert_eq!(render_loop.step(), LoopState::Terminated);

    assert_eq!(presented(&journal.iterations()[1]), vec![b]);
}

#[test]
fn test_shutdown_releases_everything_in_order() {
    let mut setup = setup(3);
    let journal = setup.journal.clone();
    let surfaces = setup.surfaces.clone();
    for surface in surfaces.iter() {
        setup.context.close_during_poll(*surface, 1);
    }

    let mut render_loop = render_loop(setup, UNIFORM_COLOR);
    render_loop.step();
    let program = render_loop.program().native_program().unwrap();
    assert!(render_loop.active_program().is_active(program));
    assert_eq!(render_loop.context().live_surfaces(), 3);
    assert_eq!(render_loop.driver().live_programs(), 1);
    assert_eq!(render_loop.driver().live_vertex_sources(), 1);
    let report = render_loop.shutdown();
    assert_eq!(report.iterations, 1);

    let calls = journal.calls();
    let released: Vec<Call> = calls
        .iter()
        .skip_while(|call| **call != Call::PollEvents)
        .skip(1)
        .cloned()
        .collect();
    let mut expected: Vec<Call> = surfaces.iter().map(|s| Call::DestroySurface(*s)).collect();
    expected.push(Call::UseProgram(None));
    expected.push(Call::DeleteProgram(program));
    assert_eq!(&released[..expected.len()], &expected[..]);
    assert!(matches!(released.last(), Some(Call::DeleteVertexSource(_))));
}

#[test]
fn test_run_leaves_nothing_alive() {
    let Setup {
        mut context,
        mut driver,
        surfaces,
        ..
    } = setup(2);
    context.close_during_poll(surfaces[0], 1);
    context.close_during_poll(surfaces[1], 2);
    let program = ShaderProgram::from_sources(&mut driver, UNIFORM_COLOR).unwrap();
    let vertex_source = driver.create_vertex_source(3);

    let config = LoopConfig::default();
    let render_loop =
        RenderLoop::new(&mut context, &mut driver, program, vertex_source, surfaces, config);
    let report = render_loop.unwrap().run();
    assert_eq!(report.frames_presented, vec![1, 2]);

    assert_eq!(context.live_surfaces(), 0);
    assert_eq!(driver.live_shaders(), 0);
    assert_eq!(driver.live_programs(), 0);
    assert_eq!(driver.live_vertex_sources(), 0);
}

#[test]
fn test_new_requires_a_surface() {
    let Setup {
        mut context,
        mut driver,
        ..
    } = setup(0);
    let program = ShaderProgram::from_sources(&mut driver, UNIFORM_COLOR).unwrap();
    let vertex_source = driver.create_vertex_source(3);

    let config = LoopConfig::default();
    let result = RenderLoop::new(&mut context, &mut driver, program, vertex_source, vec![], config);
    assert!(matches!(result, Err(LoopError::NoSurfaces)));
    drop(result);

    assert_eq!(driver.live_programs(), 0);
    assert_eq!(driver.live_vertex_sources(), 0);
}

#[test]
fn test_new_requires_a_linked_program() {
    let Setup {
        journal,
        mut context,
        mut driver,
        surfaces,
    } = setup(2);
    let vertex = ShaderUnit::compile(&mut driver, ShaderStage::Vertex, UNIFORM_COLOR.vertex);
    let fragment = ShaderUnit::compile(
        &mut driver,
        ShaderStage::Fragment,
        "#version 330 core\nvoid main() {}",
    );
    let program = ShaderProgram::build(&mut driver, vertex, fragment);
    let vertex_source = driver.create_vertex_source(3);

    let config = LoopConfig::default();
    let result = RenderLoop::new(
        &mut context,
        &mut driver,
        program,
        vertex_source,
        surfaces.clone(),
        config,
    );
    assert!(matches!(
        result,
        Err(LoopError::Shader(ShaderError::LinkFailure { .. }))
    ));
    drop(result);

    // Everything handed to the loop is released, surfaces in creation order
    assert_eq!(context.live_surfaces(), 0);
    assert_eq!(driver.live_shaders(), 0);
    assert_eq!(driver.live_programs(), 0);
    assert_eq!(driver.live_vertex_sources(), 0);
    let destroyed: Vec<SurfaceHandle> = journal
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::DestroySurface(surface) => Some(surface),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, surfaces);
}

#[test]
fn test_surface_creation_failure_cleans_up() {
    let journal = Journal::default();
    let mut context = FakeContext::new(journal.clone());
    context.fail_on_title = Some("second".to_owned());
    let builders = [
        WindowBuilder::new().with_title("first".to_owned()),
        WindowBuilder::new().with_title("second".to_owned()),
        WindowBuilder::new().with_title("third".to_owned()),
    ];

    let result = create_surfaces(&mut context, &builders);
    assert!(matches!(result, Err(SurfaceError::Creation { ref title, .. }) if title == "second"));
    assert_eq!(context.live_surfaces(), 0);
    assert_eq!(journal.count(|call| matches!(call, Call::DestroySurface(_))), 1);

    let err: LoopError = result.unwrap_err().into();
    assert!(matches!(err, LoopError::Surface(_)));
}

#[test]
fn test_custom_config_is_used() {
    let mut setup = setup(1);
    let journal = setup.journal.clone();
    setup.context.close_during_poll(setup.surfaces[0], 1);

    let Setup {
        context,
        mut driver,
        surfaces,
        ..
    } = setup;
    let program = ShaderProgram::from_sources(&mut driver, UNIFORM_COLOR).unwrap();
    let vertex_source = driver.create_vertex_source(3);
    let config = LoopConfig::new()
        .with_clear_color(Vec4::new(1.0, 0.0, 1.0, 1.0))
        .with_uniform_name("tint".to_owned());

    RenderLoop::new(context, driver, program, vertex_source, surfaces, config)
        .unwrap()
        .run();

    assert_eq!(journal.count(|call| *call == Call::Clear(Vec4::new(1.0, 0.0, 1.0, 1.0))), 1);
    assert_eq!(journal.count(|call| *call == Call::UniformQuery("tint".to_owned())), 1);
    assert_eq!(journal.count(|call| matches!(call, Call::Uniform4(..))), 0);
}
