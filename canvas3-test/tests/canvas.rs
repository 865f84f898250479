use anyhow::{ensure, Context};
use canvas3::{
    canvas::Canvas,
    events::{Event, EventName},
    graph2d::Graphics2D,
    types::{glam::IVec2, Viewport},
    CanvasError,
};
use canvas3_test::{MockPlatform, RecordingBackend, TestRunner};

#[test]
pub fn resize_before_open_records_size() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;

    ensure!(runner.resize(320, 200));
    assert_eq!(runner.framebuffer_size(), IVec2::new(320, 200));

    runner.open().context("Driver failed to open")?;
    assert_eq!(runner.viewport(), Viewport::new(0, 0, 320, 200));
    assert_eq!(runner.backend().framebuffer.dimensions(), (320, 200));
    assert_eq!(runner.platform().window.as_ref().map(|w| w.size), Some(IVec2::new(320, 200)));

    Ok(())
}

#[test]
pub fn resize_after_open_needs_permission_and_broadcasts() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open().context("Driver failed to open")?;

    let id = runner.common().canvas().id();
    let listener = runner.events.subscribe(&[EventName::CanvasResize(id)]);

    assert!(!runner.resize(800, 600));
    assert_eq!(runner.framebuffer_size(), IVec2::new(640, 480));
    assert_eq!(listener.pending(), 0);

    runner.common_mut().canvas_mut().allow_resize(true);
    assert!(runner.resize(800, 600));
    assert_eq!(listener.drain(), vec![Event::canvas_resize(id)]);

    // The driver itself is subscribed to its own canvas as well.
    assert_eq!(runner.process_events()?, 1);
    assert_eq!(runner.viewport(), Viewport::new(0, 0, 800, 600));

    Ok(())
}

#[test]
pub fn system_events_open_and_close() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;

    runner.events.broadcast(Event::new(EventName::SystemOpen));
    assert_eq!(runner.process_events()?, 1);
    assert!(runner.is_open());
    assert!(runner.platform().window.is_some());

    runner.events.broadcast(Event::new(EventName::SystemClose));
    assert_eq!(runner.process_events()?, 1);
    assert!(!runner.is_open());
    assert!(runner.platform().window.is_none());

    Ok(())
}

#[test]
pub fn fit_to_working_area_shrinks_window() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder()
        .config("Video.ScreenWidth", "800")
        .config("Video.ScreenHeight", "600")
        .config("Video.FitToWorkingArea", "yes")
        .platform(MockPlatform::new().with_workspace(IVec2::new(700, 500), IVec2::new(20, 40)))
        .build()?;
    runner.open().context("Driver failed to open")?;

    assert_eq!(runner.framebuffer_size(), IVec2::new(680, 460));
    assert_eq!(runner.viewport(), Viewport::new(0, 0, 680, 460));
    assert!(!runner.common().canvas().common().is_resize_allowed());

    Ok(())
}

#[test]
pub fn full_screen_is_not_fitted() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder()
        .config("Video.ScreenWidth", "800")
        .config("Video.ScreenHeight", "600")
        .config("Video.FullScreen", "yes")
        .config("Video.FitToWorkingArea", "yes")
        .platform(MockPlatform::new().with_workspace(IVec2::new(700, 500), IVec2::ZERO))
        .build()?;
    runner.open().context("Driver failed to open")?;

    assert_eq!(runner.framebuffer_size(), IVec2::new(800, 600));
    assert_eq!(runner.platform().window.as_ref().map(|w| w.full_screen), Some(true));

    Ok(())
}

#[test]
pub fn window_failure_fails_open() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder()
        .platform(MockPlatform::new().failing_open())
        .build()?;

    assert!(matches!(runner.open(), Err(CanvasError::WindowCreation { .. })));
    assert!(!runner.is_open());
    assert!(!runner.common().canvas().is_open());

    Ok(())
}

#[test]
pub fn title_and_print() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().config("Video.WindowTitle", "Hello").build()?;
    runner.open().context("Driver failed to open")?;
    assert_eq!(runner.platform().title, "Hello");

    runner.print(None);
    assert_eq!(runner.platform().swaps, 1);

    runner.common_mut().canvas_mut().set_title("Renamed");
    assert_eq!(runner.platform().title, "Renamed");

    Ok(())
}

#[test]
pub fn close_is_idempotent() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder()
        .backend(RecordingBackend::new(IVec2::new(640, 480)).with_extensions("GL_ARB_multisample"))
        .build()?;
    runner.open().context("Driver failed to open")?;
    runner.open().context("Second open failed")?;
    assert_eq!(runner.platform().tried_formats.len(), 1);
    assert_eq!(runner.extensions().len(), 1);

    runner.close();
    runner.close();
    assert!(!runner.is_open());
    assert!(runner.extensions().is_empty());

    Ok(())
}
