//! UI models that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! DOM contract and the frame scheduling on the host.

/// Roster shipped with the app.
pub const BUNDLED_ROSTER: &str = include_str!("../data/loyalists.json");

/// Marks an avatar group in the pyramid SVG.
pub const AVATAR_ATTR: &str = "data-pfp";
pub const USERNAME_ATTR: &str = "data-username";
pub const GENERATION_ATTR: &str = "data-gen";
/// Marks a generation block in the list panel.
pub const GROUP_ATTR: &str = "data-gen-container";
/// Marks the sticky header inside a generation block.
pub const GROUP_HEADER_ATTR: &str = "data-gen-header";

pub fn avatar_selector() -> String {
    format!("[{AVATAR_ATTR}=\"1\"]")
}

pub fn group_selector(generation: usize) -> String {
    format!("[{GROUP_ATTR}=\"{generation}\"]")
}

pub fn group_header_selector() -> String {
    format!("[{GROUP_HEADER_ATTR}]")
}

/// Attribute selector for a list row; quotes and backslashes are escaped.
pub fn row_selector(username: &str) -> String {
    let mut escaped = String::with_capacity(username.len());
    for c in username.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("[{USERNAME_ATTR}=\"{escaped}\"]")
}

/// Coalesces frame requests: at most one animation frame is pending at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGate {
    scheduled: bool,
}

impl FrameGate {
    /// Whether the caller must schedule a new frame.
    pub fn request(&mut self, needs_frames: bool) -> bool {
        if needs_frames && !self.scheduled {
            self.scheduled = true;
            return true;
        }
        false
    }

    /// Call at the top of a frame callback.
    pub fn begin_frame(&mut self) {
        self.scheduled = false;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

/// Header of the list panel: title bar or search bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchPanel {
    open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    /// Close the bar and clear the query.
    Close,
    Ignore,
}

impl SearchPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing always clears the query; the caller applies that to the session.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn on_key(&mut self, key: &str) -> SearchKey {
        if key == "Escape" {
            self.close();
            SearchKey::Close
        } else {
            SearchKey::Ignore
        }
    }

    pub fn title_class(&self) -> &'static str {
        if self.open {
            "list-title hidden"
        } else {
            "list-title"
        }
    }

    pub fn search_class(&self) -> &'static str {
        if self.open {
            "list-search"
        } else {
            "list-search hidden"
        }
    }
}

pub fn row_class(hovered: bool) -> &'static str {
    if hovered {
        "list-row hovered"
    } else {
        "list-row"
    }
}
