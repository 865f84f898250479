use canvas3::{
    graph2d::Graphics2D,
    opengl::GlCapability,
    types::{find_rgb_opaque, glam::Vec3, ClipRect, Viewport},
};
use canvas3_test::TestRunner;

#[test]
pub fn partial_viewport_survives_resize() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open_resizable()?;

    runner.set_viewport(Viewport::new(100, 100, 200, 100));
    assert!(runner.resize(800, 600));
    assert_eq!(runner.viewport(), Viewport::new(100, 100, 200, 100));
    assert_eq!(runner.clip_rect(), ClipRect::new(0, 0, 200, 100));
    assert_eq!(runner.backend().framebuffer.dimensions(), (800, 600));

    Ok(())
}

#[test]
pub fn full_viewport_grows_with_framebuffer() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open_resizable()?;
    assert_eq!(runner.viewport(), Viewport::new(0, 0, 640, 480));

    assert!(runner.resize(800, 600));
    assert_eq!(runner.viewport(), Viewport::new(0, 0, 800, 600));
    assert_eq!(runner.clip_rect(), ClipRect::new(0, 0, 800, 600));
    assert_eq!(runner.backend().viewport, Viewport::new(0, 0, 800, 600));
    assert_eq!(runner.backend().scissor, ClipRect::new(0, 0, 800, 600));

    Ok(())
}

#[test]
pub fn clip_rect_limits_drawing() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open()?;
    runner.begin_draw();

    runner.set_clip_rect(ClipRect::new(10, 10, 50, 50));
    assert_eq!(runner.backend().scissor, ClipRect::new(10, 10, 50, 50));

    runner.draw_box(0, 0, 100, 100, find_rgb_opaque(255, 255, 255));
    let call = runner.backend().draw_calls.last().cloned().expect("box was drawn");
    assert_eq!(call.vertices[0], Vec3::new(10.0, 10.0, 0.0));
    assert_eq!(call.vertices[2], Vec3::new(50.0, 50.0, 0.0));

    let before = runner.backend().draw_calls.len();
    runner.draw_box(60, 60, 10, 10, find_rgb_opaque(255, 255, 255));
    assert_eq!(runner.backend().draw_calls.len(), before);

    runner.finish_draw();
    Ok(())
}

#[test]
pub fn clip_rect_is_clamped_to_viewport() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open()?;

    runner.set_clip_rect(ClipRect::new(-20, 5, 1000, 1000));
    assert_eq!(runner.clip_rect(), ClipRect::new(0, 5, 640, 480));

    runner.set_viewport(Viewport::new(0, 0, 100, 100));
    assert_eq!(runner.clip_rect(), ClipRect::new(0, 5, 100, 100));

    Ok(())
}

#[test]
pub fn nested_draw_sets_up_state_once() -> anyhow::Result<()> {
    let mut runner = TestRunner::builder().build()?;
    runner.open()?;

    assert!(runner.begin_draw());
    assert!(runner.begin_draw());
    let setup = runner
        .backend()
        .capability_changes
        .iter()
        .filter(|(cap, _)| matches!(cap, GlCapability::DepthTest | GlCapability::ScissorTest))
        .count();
    assert_eq!(setup, 2);
    assert_eq!(runner.common().frame_lock(), 2);

    runner.finish_draw();
    assert_eq!(runner.backend().flushes, 0);
    runner.finish_draw();
    assert_eq!(runner.backend().flushes, 1);
    assert_eq!(runner.common().frame_lock(), 0);

    Ok(())
}
