//! The surface this crate renders and forwards events to, abstracted
//! behind a trait so a graphical backend (explicitly out of scope here)
//! can be swapped in without touching the terminal engine.

/// Everything the terminal engine expects of whatever owns the visible
/// window: title/urgency/bell side effects and clipboard plumbing.
/// `selpaste`/`clippaste` are request/response pairs — requesting paste
/// doesn't return data synchronously, it arranges for it to arrive back
/// through the engine as host input later.
pub trait Window {
    fn set_title(&mut self, title: &str);
    fn set_icon_name(&mut self, name: &str);
    fn set_urgent(&mut self, urgent: bool);
    fn bell(&mut self, volume: i32);

    fn set_primary_selection(&mut self, data: Vec<u8>);
    fn request_primary_paste(&mut self);
    fn set_clipboard(&mut self, data: Vec<u8>);
    fn request_clipboard_paste(&mut self);
}

/// A `Window` that drops every side effect on the floor, for headless
/// use (tests, a pure PTY-pump binary with no graphical backend).
#[derive(Debug, Default)]
pub struct NullWindow {
    pub title: String,
    pub icon_name: String,
    pub urgent: bool,
    pub bell_count: u32,
    pub primary_selection: Option<Vec<u8>>,
    pub clipboard: Option<Vec<u8>>,
}

impl Window for NullWindow {
    fn set_title(&mut self, title: &str) {
        tracing::trace!(title, "set_title");
        self.title = title.to_string();
    }

    fn set_icon_name(&mut self, name: &str) {
        self.icon_name = name.to_string();
    }

    fn set_urgent(&mut self, urgent: bool) {
        self.urgent = urgent;
    }

    fn bell(&mut self, volume: i32) {
        tracing::trace!(volume, "bell");
        self.bell_count += 1;
    }

    fn set_primary_selection(&mut self, data: Vec<u8>) {
        self.primary_selection = Some(data);
    }

    fn request_primary_paste(&mut self) {}

    fn set_clipboard(&mut self, data: Vec<u8>) {
        self.clipboard = Some(data);
    }

    fn request_clipboard_paste(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_window_records_title() {
        let mut window = NullWindow::default();
        window.set_title("hello");
        assert_eq!(window.title, "hello");
    }

    #[test]
    fn null_window_counts_bells() {
        let mut window = NullWindow::default();
        window.bell(100);
        window.bell(100);
        assert_eq!(window.bell_count, 2);
    }

    #[test]
    fn null_window_stores_clipboard_set() {
        let mut window = NullWindow::default();
        window.set_clipboard(b"copied".to_vec());
        assert_eq!(window.clipboard.as_deref(), Some(&b"copied"[..]));
    }
}
