/// Gainable interaction state of a window: whether it holds keyboard focus
/// and whether the pointer is over it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GainState {
    pub focus: bool,
    pub hover: bool,
}

impl GainState {
    pub const NONE: GainState = GainState {
        focus: false,
        hover: false,
    };

    pub const fn new(focus: bool, hover: bool) -> Self {
        Self { focus, hover }
    }
}

/// Host-level requests owned by the frame loop that must reach the terminal
/// driver. OS focus and hover live on the window stack.
#[derive(Debug, Clone, Copy)]
pub struct HostState {
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
    quit_requested: bool,
}

impl Default for HostState {
    fn default() -> Self {
        Self::new()
    }
}

impl HostState {
    pub fn new() -> Self {
        Self {
            mouse_capture_enabled: true,
            mouse_capture_dirty: false,
            quit_requested: false,
        }
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    /// Report the current capture state again on the next
    /// `take_mouse_capture_change`, e.g. after the terminal was re-entered.
    pub fn resync_mouse_capture(&mut self) {
        self.mouse_capture_dirty = true;
    }

    pub fn toggle_mouse_capture(&mut self) {
        let enabled = !self.mouse_capture_enabled;
        self.set_mouse_capture_enabled(enabled);
    }

    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if self.mouse_capture_dirty {
            self.mouse_capture_dirty = false;
            Some(self.mouse_capture_enabled)
        } else {
            None
        }
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
