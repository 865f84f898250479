use std::{
    fs::create_dir_all,
    ops::{Deref, DerefMut},
    path::Path,
};

use anyhow::{bail, Context, Result};
use canvas3::{
    canvas::{Canvas, CanvasServices},
    config::{CommandLine, ConfigFile, ConfigManager, SharedConfig, PRIORITY_APPLICATION},
    events::EventQueue,
    graph2d::Graphics2D,
    opengl::{DriverDatabase, GlCanvas, GlGraphics2D},
    registry::CanvasRegistry,
};
use glam::IVec2;

use crate::{backend::RecordingBackend, platform::MockPlatform};

/// The driver every test runs against.
pub type TestDriver = GlGraphics2D<MockPlatform, RecordingBackend>;

#[derive(Default)]
pub struct TestRunnerBuilder {
    config: Vec<(String, String)>,
    args: Vec<String>,
    platform: Option<MockPlatform>,
    backend: Option<RecordingBackend>,
    driver_db: Option<DriverDatabase>,
}

impl TestRunnerBuilder {
    pub fn new() -> Self {
        TestRunnerBuilder::default()
    }

    /// Adds an application level configuration value.
    pub fn config(mut self, key: &str, value: &str) -> Self {
        self.config.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|&arg| arg.to_owned()));
        self
    }

    pub fn platform(mut self, platform: MockPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn backend(mut self, backend: RecordingBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn driver_database(mut self, driver_db: DriverDatabase) -> Self {
        self.driver_db = Some(driver_db);
        self
    }

    pub fn build(self) -> Result<TestRunner> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut manager = ConfigManager::new();
        manager.add_layer(
            "test",
            PRIORITY_APPLICATION,
            ConfigFile::from_pairs(self.config.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        );
        let config = manager.into_shared();
        let events = EventQueue::new();
        let registry = CanvasRegistry::new();

        let mut services = CanvasServices::new(config.clone()).with_events(events.clone());
        if !self.args.is_empty() {
            services = services.with_command_line(CommandLine::parse(&self.args));
        }

        let canvas = GlCanvas::new(self.platform.unwrap_or_default(), &registry);
        let backend = self
            .backend
            .unwrap_or_else(|| RecordingBackend::new(IVec2::new(640, 480)));
        let mut driver = GlGraphics2D::new(canvas, backend);
        if let Some(driver_db) = self.driver_db {
            driver = driver.with_driver_database(driver_db);
        }
        driver.initialize(&services);

        Ok(TestRunner {
            driver,
            config,
            events,
            registry,
        })
    }
}

pub struct TestRunner {
    pub driver: TestDriver,
    pub config: SharedConfig,
    pub events: EventQueue,
    pub registry: CanvasRegistry,
}

impl Deref for TestRunner {
    type Target = TestDriver;

    fn deref(&self) -> &Self::Target {
        &self.driver
    }
}

impl DerefMut for TestRunner {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.driver
    }
}

impl TestRunner {
    pub fn builder() -> TestRunnerBuilder {
        TestRunnerBuilder::new()
    }

    /// Opens the driver and lets the canvas be resized afterwards.
    pub fn open_resizable(&mut self) -> Result<()> {
        self.driver.open().context("Driver failed to open")?;
        self.driver.common_mut().canvas_mut().allow_resize(true);
        Ok(())
    }

    pub fn platform(&self) -> &MockPlatform {
        self.driver.common().canvas().common().platform()
    }

    pub fn platform_mut(&mut self) -> &mut MockPlatform {
        self.driver.common_mut().canvas_mut().common_mut().platform_mut()
    }

    pub fn backend(&self) -> &RecordingBackend {
        self.driver.backend()
    }

    /// Takes a screenshot and compares it with the image at `path`, which is
    /// written instead when it does not exist yet. On mismatch the screenshot
    /// is saved next to it as `<name>-failure.png`.
    pub fn screenshot_and_compare(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let test_rgba = self.driver.screenshot().context("Screenshot failed")?;

        let parent_path = path.parent().context("Path given had no parent")?;
        let Ok(expected) = image::open(path) else {
            create_dir_all(parent_path).context("Could not create parent directory")?;
            test_rgba.save(path).context("Could not save image")?;
            return Ok(());
        };
        let expected = expected.into_rgba8();

        let mismatched = match expected.dimensions() == test_rgba.dimensions() {
            true => expected
                .pixels()
                .zip(test_rgba.pixels())
                .filter(|(a, b)| a != b)
                .count(),
            false => usize::MAX,
        };
        if mismatched != 0 {
            let filename = path.file_stem().context("Path given had no file name")?;
            let failure_path = parent_path.join(format!("{}-failure.png", filename.to_string_lossy()));
            test_rgba.save(&failure_path).context("Could not save failure image")?;
            bail!("Image comparison failed: {} pixels differ", mismatched);
        }
        Ok(())
    }
}
