/// How the mouse cursor is drawn.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseCursorMode {
    /// Software cursor; the application draws it.
    Off,
    /// The system cursor is used for every shape.
    #[default]
    On,
    /// The system cursor is used only for custom RGBA images.
    RgbaOnly,
}

impl MouseCursorMode {
    /// Parses the `Video.SystemMouseCursor` configuration value.
    ///
    /// `yes`, `true`, `on` (any case) and `1` select [`MouseCursorMode::On`],
    /// `rgbaonly` selects [`MouseCursorMode::RgbaOnly`], everything else is
    /// [`MouseCursorMode::Off`].
    pub fn from_config_str(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("yes")
            || value.eq_ignore_ascii_case("true")
            || value.eq_ignore_ascii_case("on")
            || value == "1"
        {
            Self::On
        } else if value.eq_ignore_ascii_case("rgbaonly") {
            Self::RgbaOnly
        } else {
            Self::Off
        }
    }
}

/// Stock cursor shapes a platform may be able to show.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseCursorShape {
    None,
    Arrow,
    Lens,
    Cross,
    Pen,
    Move,
    SizeNwse,
    SizeNesw,
    SizeNs,
    SizeEw,
    Stop,
    Wait,
}

/// Window decoration elements that can be queried or toggled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WindowDecoration {
    Caption,
    ClientFrame,
}

/// Severity of a platform alert box.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Error,
    Warning,
    Note,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_mode_parse() {
        assert_eq!(MouseCursorMode::from_config_str("yes"), MouseCursorMode::On);
        assert_eq!(MouseCursorMode::from_config_str("TRUE"), MouseCursorMode::On);
        assert_eq!(MouseCursorMode::from_config_str("On"), MouseCursorMode::On);
        assert_eq!(MouseCursorMode::from_config_str("1"), MouseCursorMode::On);
        assert_eq!(MouseCursorMode::from_config_str("RGBAonly"), MouseCursorMode::RgbaOnly);
        assert_eq!(MouseCursorMode::from_config_str("no"), MouseCursorMode::Off);
        assert_eq!(MouseCursorMode::from_config_str("2"), MouseCursorMode::Off);
    }
}
