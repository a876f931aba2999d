//! The terminal engine: turns host output bytes into mutations of a
//! [`crate::grid::Screen`], and turns certain sequences into bytes that
//! must be written back to the pty (cursor/device reports, answerback).
//!
//! Tokenizing is delegated entirely to [`vt_push_parser`]; this module
//! only decides what each [`VTEvent`] means for the grid. SGR mouse and
//! keyboard *encoding* lives in [`crate::event`] — this engine only
//! tracks which protocol is currently enabled.

use bitflags::bitflags;
use vt_push_parser::event::{Esc, EscInvalid, VTEvent, DCS};
use vt_push_parser::{VTPushParser, VT_PARSER_INTEREST_ALL};

use unicode_width::UnicodeWidthChar;
use xparsecolor::XColor;

use crate::codec::{utf8encode, Utf8Decoder, Step, UTF8_MAX_LEN};
use crate::grid::{Cell, Color, CursorState, CursorStyle, Glyph, GlyphAttrs, Screen};

bitflags! {
    /// Terminal-wide mode bits toggled by SM/RM (DECSET/DECRST).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modes: u32 {
        /// DECCKM: cursor keys send `ESC O` instead of `ESC [`.
        const APP_CURSOR      = 1 << 0;
        /// DECKPAM/DECKPNM: numeric keypad sends application sequences.
        const APP_KEYPAD      = 1 << 1;
        /// DECAWM: wrap to the next line at the right margin.
        const AUTOWRAP        = 1 << 2;
        /// IRM: inserted characters push the rest of the line right.
        const INSERT          = 1 << 3;
        /// Host output is interpreted as UTF-8 rather than raw bytes.
        const UTF8            = 1 << 4;
        const MOUSE_X10        = 1 << 5;
        const MOUSE_BUTTON     = 1 << 6;
        const MOUSE_ANY_MOTION = 1 << 7;
        const MOUSE_SGR        = 1 << 8;
        const MOUSE_UTF8       = 1 << 9;
        const BRACKETED_PASTE  = 1 << 10;
        const FOCUS_EVENTS     = 1 << 11;
        const ALT_SCREEN       = 1 << 12;
        const CURSOR_VISIBLE   = 1 << 13;
        /// Application is in a DECRQSS/Sixel passthrough the engine does
        /// not render; bytes are swallowed until the DCS/ESC terminator.
        const SIXEL_STUB       = 1 << 14;
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::AUTOWRAP | Self::UTF8 | Self::CURSOR_VISIBLE
    }
}

/// Which of the four VT220 mouse reporting protocols is active, derived
/// from whichever of `Modes::MOUSE_*` was most recently set. `Sgr` wins
/// over plain X10/normal tracking when both are enabled, matching
/// xterm's behavior of the last-enabled encoding taking precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseProtocol {
    #[default]
    Off,
    X10,
    Normal,
    Sgr,
}

/// One of the four designatable character sets (`G0`-`G3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC Special Graphics (line-drawing), selected with `ESC ( 0`.
    Graphics,
    /// UK national replacement charset, selected with `ESC ( A`.
    Uk,
}

impl Charset {
    /// Translate `ch` through this charset's mapping. Only
    /// [`Self::Graphics`] changes anything; every other charset this
    /// engine recognizes is ASCII-transparent.
    #[must_use]
    fn translate(self, ch: char) -> char {
        match self {
            Self::Graphics => graphics_charset(ch),
            Self::Ascii | Self::Uk => ch,
        }
    }
}

/// DEC Special Graphics mapping for the line-drawing character set, for
/// the subset of codes actually emitted by curses/ncurses applications.
fn graphics_charset(ch: char) -> char {
    match ch {
        '`' => '\u{25c6}', // diamond
        'a' => '\u{2592}', // checkerboard
        'f' => '\u{00b0}', // degree
        'g' => '\u{00b1}', // plus/minus
        'j' => '\u{2518}',
        'k' => '\u{2510}',
        'l' => '\u{250c}',
        'm' => '\u{2514}',
        'n' => '\u{253c}',
        'q' => '\u{2500}',
        't' => '\u{251c}',
        'u' => '\u{2524}',
        'v' => '\u{2534}',
        'w' => '\u{252c}',
        'x' => '\u{2502}',
        other => other,
    }
}

/// Events surfaced to whatever owns this engine (typically published on
/// an event bus by the caller); rendering is not this crate's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Bell,
    TitleChanged(String),
    IconNameChanged(String),
    ClipboardSet { selection: u8, data: Vec<u8> },
    ModesChanged,
}

const MAX_CSI_PARAMS: usize = 16;

/// Interprets host (application-to-terminal) output against a
/// [`Screen`], producing in-band replies (device/cursor reports) and
/// out-of-band [`EngineEvent`]s.
pub struct Terminal {
    screen: Screen,
    parser: VTPushParser<VT_PARSER_INTEREST_ALL>,
    modes: Modes,
    mouse: MouseProtocol,
    charsets: [Charset; 4],
    gl: usize,
    saved_gl: usize,
    utf8: Utf8Decoder,
    title: String,
    icon_name: String,
    answerback: &'static str,
    palette_overrides: std::collections::HashMap<u8, Color>,
    default_bg: Option<Color>,
}

impl Terminal {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            screen: Screen::new(cols, rows),
            parser: VTPushParser::new_with_interest::<VT_PARSER_INTEREST_ALL>(),
            modes: Modes::default(),
            mouse: MouseProtocol::default(),
            charsets: [Charset::default(); 4],
            gl: 0,
            saved_gl: 0,
            utf8: Utf8Decoder::new(),
            title: String::new(),
            icon_name: String::new(),
            answerback: "",
            palette_overrides: std::collections::HashMap::new(),
            default_bg: None,
        }
    }

    /// The OSC 4-set replacement for palette entry `index`, if any;
    /// `None` means the embedder's own default for that index applies.
    #[must_use]
    pub fn palette_override(&self, index: u8) -> Option<Color> {
        self.palette_overrides.get(&index).copied()
    }

    /// The OSC 11-set default background color, if any.
    #[must_use]
    pub const fn default_background(&self) -> Option<Color> {
        self.default_bg
    }

    /// Encode a mouse action (from whatever owns the window/pointer) as
    /// the report bytes to write back to the pty, in whichever of the
    /// three report encodings [`MouseProtocol`] selects. Returns `None`
    /// when mouse reporting is off.
    #[must_use]
    pub fn encode_mouse_event(
        &self,
        kind: crate::event::mouse::MouseEventKind,
        col: u16,
        row: u16,
        modifiers: crate::event::keyboard::KeyModifiers,
    ) -> Option<Vec<u8>> {
        use crate::event::mouse::{Coordinates, DefaultMouseEvent, MouseEvent};
        use vtansi::AnsiEncode;

        if self.mouse == MouseProtocol::Off {
            return None;
        }
        let event = MouseEvent::new(kind, modifiers.into(), Coordinates::new(col + 1, row + 1));
        match self.mouse {
            MouseProtocol::Off => None,
            MouseProtocol::Sgr => event.encode_ansi().ok(),
            MouseProtocol::X10 | MouseProtocol::Normal => DefaultMouseEvent(event).encode_ansi().ok(),
        }
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// The bus [`crate::grid::Refresh`] is published on whenever the
    /// screen gains new dirty content.
    pub fn bus_mut(&mut self) -> &mut vtreactor::Bus {
        self.screen.bus_mut()
    }

    #[must_use]
    pub const fn modes(&self) -> Modes {
        self.modes
    }

    #[must_use]
    pub const fn mouse_protocol(&self) -> MouseProtocol {
        self.mouse
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.screen.resize(cols, rows);
    }

    /// Feed a chunk of host output through the engine. Returns the bytes
    /// (if any) that must be written back to the pty in response (DSR,
    /// DA, `XTWINOPS` queries, and so on); any side-visible changes are
    /// reported through `on_event`.
    pub fn feed<F>(&mut self, bytes: &[u8], on_event: &mut F) -> Vec<u8>
    where
        F: FnMut(EngineEvent),
    {
        let mut out = Vec::new();
        // `feed_with` borrows `self.parser` mutably while needing the
        // rest of `self` mutable too, so take it out for the duration.
        let mut parser = std::mem::replace(
            &mut self.parser,
            VTPushParser::new_with_interest::<VT_PARSER_INTEREST_ALL>(),
        );
        parser.feed_with(bytes, |event: VTEvent| {
            self.dispatch(&event, &mut *on_event, &mut out);
        });
        self.parser = parser;
        out
    }

    fn dispatch<F>(&mut self, event: &VTEvent, on_event: &mut F, out: &mut Vec<u8>)
    where
        F: FnMut(EngineEvent),
    {
        match event {
            VTEvent::Raw(bytes) => self.feed_text(bytes),
            VTEvent::C0(byte) => self.handle_c0(*byte, on_event),
            VTEvent::Esc(esc) => self.handle_esc(*esc),
            VTEvent::EscInvalid(invalid) => self.handle_esc_invalid(*invalid),
            VTEvent::Csi(csi) => self.handle_csi(csi, on_event, out),
            VTEvent::OscEnd { data, .. } => self.handle_osc(data, on_event, out),
            VTEvent::DcsStart(dcs) => self.handle_dcs_start(dcs),
            VTEvent::DcsEnd(_) | VTEvent::DcsCancel => {
                self.modes.remove(Modes::SIXEL_STUB);
            }
            VTEvent::OscStart
            | VTEvent::OscCancel
            | VTEvent::OscData(_)
            | VTEvent::DcsData(_)
            | VTEvent::Ss2(_)
            | VTEvent::Ss3(_) => {}
        }
    }

    fn feed_text(&mut self, bytes: &[u8]) {
        if self.modes.contains(Modes::SIXEL_STUB) {
            return;
        }
        if !self.modes.contains(Modes::UTF8) {
            for &b in bytes {
                self.put_char(char::from(b));
            }
            return;
        }
        for &b in bytes {
            match self.utf8.feed(b) {
                Step::Continue => {}
                Step::Complete(cp) | Step::Invalid(cp) => {
                    if let Some(ch) = char::from_u32(cp) {
                        self.put_char(ch);
                    }
                }
            }
        }
    }

    fn put_char(&mut self, ch: char) {
        let ch = self.charsets[self.gl].translate(ch);
        let cols = self.screen.cols();
        if cols == 0 {
            return;
        }

        let width = ch.width().unwrap_or(1).clamp(1, 2) as u16;

        let cursor = *self.screen.cursor();
        let mut col = cursor.pos.col;
        let mut row = cursor.pos.row;

        if cursor.state.contains(CursorState::WRAP_NEXT) {
            if col + 1 >= cols {
                col = 0;
                row = (row + 1).min(self.screen.rows().saturating_sub(1));
                if row == self.screen.bot() {
                    self.screen.scrollup(self.screen.top(), 1);
                    row = self.screen.bot();
                }
            } else {
                col += 1;
            }
        }

        if col + width > cols {
            col = 0;
            row = (row + 1).min(self.screen.rows().saturating_sub(1));
            if row == self.screen.bot() {
                self.screen.scrollup(self.screen.top(), 1);
                row = self.screen.bot();
            }
        }

        let mut glyph = cursor.pen;
        glyph.ch = ch;
        glyph.attrs.remove(GlyphAttrs::WIDE | GlyphAttrs::WDUMMY);
        if width == 2 {
            glyph.attrs.insert(GlyphAttrs::WIDE);
        }
        self.screen.set_glyph(Cell::new(col, row), glyph);

        if width == 2 && col + 1 < cols {
            let mut dummy = Glyph::default();
            dummy.ch = '\0';
            dummy.attrs.insert(GlyphAttrs::WDUMMY);
            self.screen.set_glyph(Cell::new(col + 1, row), dummy);
        }

        let mut next = *self.screen.cursor();
        next.pos = Cell::new(col, row);
        if col + width >= cols {
            next.pos.col = cols.saturating_sub(1);
            next.state.insert(CursorState::WRAP_NEXT);
        } else {
            next.pos.col = col + width;
            next.state.remove(CursorState::WRAP_NEXT);
        }
        self.screen.set_cursor(next);
    }

    fn handle_c0<F>(&mut self, byte: u8, on_event: &mut F)
    where
        F: FnMut(EngineEvent),
    {
        match byte {
            0x07 => on_event(EngineEvent::Bell),
            0x08 => {
                let mut cursor = *self.screen.cursor();
                cursor.pos.col = cursor.pos.col.saturating_sub(1);
                cursor.state.remove(CursorState::WRAP_NEXT);
                self.screen.set_cursor(cursor);
            }
            0x09 => self.tab_forward(1),
            0x0A | 0x0B | 0x0C => self.screen.newline(false),
            0x0D => {
                let mut cursor = *self.screen.cursor();
                cursor.pos.col = 0;
                cursor.state.remove(CursorState::WRAP_NEXT);
                self.screen.set_cursor(cursor);
            }
            0x0E => self.gl = 1, // SO: shift out to G1
            0x0F => self.gl = 0, // SI: shift in to G0
            _ => {}
        }
    }

    /// CHT/CBT/BHT: move the cursor `n` tab stops forward (`n` > 0) or
    /// backward (`n` < 0), consulting [`Screen`]'s tab stop set rather
    /// than a fixed stride.
    fn tab_forward(&mut self, n: i32) {
        let cols = i32::from(self.screen.cols());
        if cols == 0 {
            return;
        }
        let mut col = i32::from(self.screen.cursor().pos.col);
        let mut n = n;
        if n > 0 {
            while col < cols && n > 0 {
                n -= 1;
                col += 1;
                while col < cols && !self.screen.is_tabstop(col as u16) {
                    col += 1;
                }
            }
        } else if n < 0 {
            while col > 0 && n < 0 {
                n += 1;
                col -= 1;
                while col > 0 && !self.screen.is_tabstop(col as u16) {
                    col -= 1;
                }
            }
        }
        self.set_col(col.clamp(0, cols - 1) as u16);
    }

    /// TBC: `Ps=0` clears the tab stop under the cursor, `Ps=3` clears
    /// every tab stop. Other `Ps` values are ignored.
    fn clear_tabstops(&mut self, ps: i32) {
        match ps {
            0 => {
                let col = self.screen.cursor().pos.col;
                self.screen.clear_tabstop(col);
            }
            3 => self.screen.clear_all_tabstops(),
            _ => {}
        }
    }

    fn handle_esc(&mut self, esc: Esc) {
        let intermediates = esc.intermediates.as_ref();
        if let Some(&designator) = intermediates.first() {
            let slot = match designator {
                b'(' => Some(0),
                b')' => Some(1),
                b'*' => Some(2),
                b'+' => Some(3),
                _ => None,
            };
            if let Some(slot) = slot {
                self.charsets[slot] = match esc.final_byte {
                    b'0' => Charset::Graphics,
                    b'A' => Charset::Uk,
                    _ => Charset::Ascii,
                };
                return;
            }
        }

        match esc.final_byte {
            b'7' => self.save_cursor(),
            b'8' => self.restore_cursor(),
            b'D' => self.screen.newline(false), // IND
            b'E' => self.screen.newline(true),  // NEL
            b'H' => {
                let col = self.screen.cursor().pos.col;
                self.screen.set_tabstop(col);
            } // HTS
            b'M' => self.reverse_index(),
            b'c' => self.full_reset(),
            b'=' => self.modes.insert(Modes::APP_KEYPAD),
            b'>' => self.modes.remove(Modes::APP_KEYPAD),
            b'n' => self.gl = 2, // LS2
            b'o' => self.gl = 3, // LS3
            _ => {}
        }
    }

    fn handle_esc_invalid(&mut self, _invalid: EscInvalid) {
        // Unknown ESC sequence: ignored, matching a tolerant (non-strict
        // ECMA-48) parser that drops what it doesn't recognize.
    }

    fn reverse_index(&mut self) {
        let cursor = *self.screen.cursor();
        if cursor.pos.row == self.screen.top() {
            self.screen.scrolldown(self.screen.top(), 1);
        } else {
            let mut cursor = cursor;
            cursor.pos.row = cursor.pos.row.saturating_sub(1);
            self.screen.set_cursor(cursor);
        }
    }

    fn save_cursor(&mut self) {
        self.screen.set_stored_cursor(0, *self.screen.cursor());
        self.saved_gl = self.gl;
    }

    fn restore_cursor(&mut self) {
        let cursor = *self.screen.stored_cursor(0);
        self.screen.set_cursor(cursor);
        self.gl = self.saved_gl;
    }

    fn full_reset(&mut self) {
        self.screen.reset();
        self.modes = Modes::default();
        self.mouse = MouseProtocol::Off;
        self.charsets = [Charset::default(); 4];
        self.gl = 0;
        self.saved_gl = 0;
        self.title.clear();
        self.icon_name.clear();
        self.palette_overrides.clear();
        self.default_bg = None;
    }

    fn handle_csi<F>(&mut self, csi: &vt_push_parser::event::CSI, on_event: &mut F, out: &mut Vec<u8>)
    where
        F: FnMut(EngineEvent),
    {
        let params = parse_params(csi);
        let private = csi.private;

        match (private, csi.final_byte) {
            (None, b'A') => self.move_cursor(0, -param_or(&params, 0, 1)),
            (None, b'B' | b'e') => self.move_cursor(0, param_or(&params, 0, 1)),
            (None, b'C' | b'a') => self.move_cursor(param_or(&params, 0, 1), 0),
            (None, b'D') => self.move_cursor(-param_or(&params, 0, 1), 0),
            (None, b'E') => {
                self.move_cursor(0, param_or(&params, 0, 1));
                self.set_col(0);
            }
            (None, b'F') => {
                self.move_cursor(0, -param_or(&params, 0, 1));
                self.set_col(0);
            }
            (None, b'G' | b'`') => self.set_col(param_or(&params, 0, 1).saturating_sub(1)),
            (None, b'H' | b'f') => self.cursor_to(&params),
            (None, b'd') => self.set_row(param_or(&params, 0, 1).saturating_sub(1)),
            (None, b'I') => self.tab_forward(param_or(&params, 0, 1)),
            (None, b'Z') => self.tab_forward(-param_or(&params, 0, 1)),
            (None, b'g') => self.clear_tabstops(params.first().copied().unwrap_or(0)),
            (None, b'J') => self.erase_display(params.first().copied().unwrap_or(0)),
            (None, b'K') => self.erase_line(params.first().copied().unwrap_or(0)),
            (None, b'L') => self.screen.insertblankline(count(&params)),
            (None, b'M') => self.screen.deleteline(count(&params)),
            (None, b'P') => self.screen.deletechar(count(&params)),
            (None, b'@') => self.screen.insertblank(count(&params)),
            (None, b'X') => self.erase_chars(count(&params)),
            (None, b'S') => self.screen.scrollup(self.screen.top(), count(&params)),
            (None, b'T') => self.screen.scrolldown(self.screen.top(), count(&params)),
            (None, b'c') => out.extend_from_slice(b"\x1b[?6c"), // DA1: VT102-like
            (None, b'n') => self.device_status_report(params.first().copied().unwrap_or(0), out),
            (None, b'r') => self.set_scroll_region(&params),
            (None, b'm') => self.select_graphic_rendition(&params),
            (None, b'q') if csi.intermediates.as_ref() == b" " => {
                self.set_cursor_style(params.first().copied().unwrap_or(1));
            }
            (Some(b'?'), b'h') => self.set_dec_modes(&params, true, on_event),
            (Some(b'?'), b'l') => self.set_dec_modes(&params, false, on_event),
            (None, b'h') => self.set_ansi_modes(&params, true),
            (None, b'l') => self.set_ansi_modes(&params, false),
            _ => {}
        }
    }

    fn move_cursor(&mut self, dcol: i32, drow: i32) {
        let cursor = *self.screen.cursor();
        let col = (i32::from(cursor.pos.col) + dcol).max(0) as u16;
        let row = (i32::from(cursor.pos.row) + drow).max(0) as u16;
        self.screen.moveto(Cell::new(col, row));
    }

    fn set_col(&mut self, col: u16) {
        let row = self.screen.cursor().pos.row;
        self.screen.moveto(Cell::new(col, row));
    }

    fn set_row(&mut self, row: u16) {
        let col = self.screen.cursor().pos.col;
        self.screen.moveato(Cell::new(col, row));
    }

    fn cursor_to(&mut self, params: &[i32]) {
        let row = param_or(params, 0, 1).saturating_sub(1).max(0) as u16;
        let col = param_or(params, 1, 1).saturating_sub(1).max(0) as u16;
        self.screen.moveato(Cell::new(col, row));
    }

    fn erase_display(&mut self, mode: i32) {
        let cols = self.screen.cols().saturating_sub(1);
        let rows = self.screen.rows().saturating_sub(1);
        let cursor = self.screen.cursor().pos;
        match mode {
            0 => self.screen.clear_range(cursor, Cell::new(cols, rows)),
            1 => self.screen.clear_range(Cell::new(0, 0), cursor),
            _ => self.screen.clear(),
        }
    }

    fn erase_line(&mut self, mode: i32) {
        let cols = self.screen.cols().saturating_sub(1);
        let cursor = self.screen.cursor().pos;
        match mode {
            0 => self.screen.clear_range(cursor, Cell::new(cols, cursor.row)),
            1 => self.screen.clear_range(Cell::new(0, cursor.row), cursor),
            _ => self.screen.clear_range(Cell::new(0, cursor.row), Cell::new(cols, cursor.row)),
        }
    }

    fn erase_chars(&mut self, n: u16) {
        let cursor = self.screen.cursor().pos;
        let last = (cursor.col + n.max(1)).saturating_sub(1).min(self.screen.cols().saturating_sub(1));
        self.screen.clear_range(cursor, Cell::new(last, cursor.row));
    }

    fn set_scroll_region(&mut self, params: &[i32]) {
        let top = param_or(params, 0, 1).saturating_sub(1).max(0) as u16;
        let bot = if params.len() > 1 && params[1] > 0 {
            (params[1] - 1) as u16
        } else {
            self.screen.rows().saturating_sub(1)
        };
        self.screen.setscroll(top, bot);
        self.screen.moveato(Cell::new(0, 0));
    }

    fn set_cursor_style(&mut self, ps: i32) {
        let style = match ps {
            0 | 1 => CursorStyle::BlinkingBlock,
            2 => CursorStyle::SteadyBlock,
            3 => CursorStyle::BlinkingUnderline,
            4 => CursorStyle::SteadyUnderline,
            5 => CursorStyle::BlinkingBar,
            6 => CursorStyle::SteadyBar,
            _ => return,
        };
        self.screen.set_cursor_style(style);
    }

    fn device_status_report(&self, ps: i32, out: &mut Vec<u8>) {
        match ps {
            5 => out.extend_from_slice(b"\x1b[0n"),
            6 => {
                let cursor = self.screen.cursor().pos;
                out.extend_from_slice(
                    format!("\x1b[{};{}R", cursor.row + 1, cursor.col + 1).as_bytes(),
                );
            }
            _ => {}
        }
    }

    fn select_graphic_rendition(&mut self, params: &[i32]) {
        let mut cursor = *self.screen.cursor();
        let mut pen = cursor.pen;
        let mut i = 0;
        if params.is_empty() {
            pen.attrs = GlyphAttrs::empty();
            pen.fg = Color::DEFAULT;
            pen.bg = Color::DEFAULT;
        }
        while i < params.len() {
            match params[i] {
                0 => {
                    pen.attrs = GlyphAttrs::empty();
                    pen.fg = Color::DEFAULT;
                    pen.bg = Color::DEFAULT;
                }
                1 => pen.attrs.insert(GlyphAttrs::BOLD),
                2 => pen.attrs.insert(GlyphAttrs::FAINT),
                3 => pen.attrs.insert(GlyphAttrs::ITALIC),
                4 => pen.attrs.insert(GlyphAttrs::UNDERLINE),
                5 | 6 => pen.attrs.insert(GlyphAttrs::BLINK),
                7 => pen.attrs.insert(GlyphAttrs::REVERSE),
                8 => pen.attrs.insert(GlyphAttrs::INVISIBLE),
                9 => pen.attrs.insert(GlyphAttrs::STRUCK),
                22 => pen.attrs.remove(GlyphAttrs::BOLD | GlyphAttrs::FAINT),
                23 => pen.attrs.remove(GlyphAttrs::ITALIC),
                24 => pen.attrs.remove(GlyphAttrs::UNDERLINE),
                25 => pen.attrs.remove(GlyphAttrs::BLINK),
                27 => pen.attrs.remove(GlyphAttrs::REVERSE),
                28 => pen.attrs.remove(GlyphAttrs::INVISIBLE),
                29 => pen.attrs.remove(GlyphAttrs::STRUCK),
                30..=37 => pen.fg = Color::palette((params[i] - 30) as u8),
                38 => {
                    if let Some((color, consumed)) = extended_color(&params[i + 1..]) {
                        pen.fg = color;
                        i += consumed;
                    }
                }
                39 => pen.fg = Color::DEFAULT,
                40..=47 => pen.bg = Color::palette((params[i] - 40) as u8),
                48 => {
                    if let Some((color, consumed)) = extended_color(&params[i + 1..]) {
                        pen.bg = color;
                        i += consumed;
                    }
                }
                49 => pen.bg = Color::DEFAULT,
                90..=97 => pen.fg = Color::palette((params[i] - 90 + 8) as u8),
                100..=107 => pen.bg = Color::palette((params[i] - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
        cursor.pen = pen;
        self.screen.set_cursor(cursor);
    }

    fn set_dec_modes<F>(&mut self, params: &[i32], enable: bool, on_event: &mut F)
    where
        F: FnMut(EngineEvent),
    {
        for &p in params {
            match p {
                1 => self.modes.set(Modes::APP_CURSOR, enable),
                6 => {
                    let mut cursor = *self.screen.cursor();
                    cursor.state.set(CursorState::ORIGIN, enable);
                    self.screen.set_cursor(cursor);
                }
                7 => self.modes.set(Modes::AUTOWRAP, enable),
                9 => self.set_mouse(enable, MouseProtocol::X10),
                25 => self.modes.set(Modes::CURSOR_VISIBLE, enable),
                1000 => self.set_mouse(enable, MouseProtocol::Normal),
                1002 => {
                    self.modes.set(Modes::MOUSE_BUTTON, enable);
                    self.set_mouse(enable, MouseProtocol::Normal);
                }
                1003 => {
                    self.modes.set(Modes::MOUSE_ANY_MOTION, enable);
                    self.set_mouse(enable, MouseProtocol::Normal);
                }
                1005 => self.modes.set(Modes::MOUSE_UTF8, enable),
                1006 => self.set_mouse(enable, MouseProtocol::Sgr),
                1049 => {
                    if enable {
                        self.save_cursor();
                        self.screen.swapscreen();
                    } else {
                        self.screen.swapscreen();
                        self.restore_cursor();
                    }
                    self.modes.set(Modes::ALT_SCREEN, enable);
                }
                1047 | 47 => {
                    self.screen.swapscreen();
                    self.modes.set(Modes::ALT_SCREEN, enable);
                }
                2004 => self.modes.set(Modes::BRACKETED_PASTE, enable),
                1004 => self.modes.set(Modes::FOCUS_EVENTS, enable),
                _ => continue,
            }
        }
        on_event(EngineEvent::ModesChanged);
    }

    fn set_mouse(&mut self, enable: bool, protocol: MouseProtocol) {
        self.mouse = if enable { protocol } else { MouseProtocol::Off };
        self.modes.set(Modes::MOUSE_X10, enable && protocol == MouseProtocol::X10);
        self.modes.set(Modes::MOUSE_SGR, enable && protocol == MouseProtocol::Sgr);
    }

    fn set_ansi_modes(&mut self, params: &[i32], enable: bool) {
        for &p in params {
            if p == 4 {
                self.modes.set(Modes::INSERT, enable);
            }
        }
    }

    fn handle_osc<F>(&mut self, data: &[u8], on_event: &mut F, out: &mut Vec<u8>)
    where
        F: FnMut(EngineEvent),
    {
        let Some(semicolon) = data.iter().position(|&b| b == b';') else {
            return;
        };
        let Ok(ps) = atoi_simd::parse::<u32>(&data[..semicolon]) else {
            return;
        };
        let body = &data[semicolon + 1..];
        match ps {
            0 | 2 => {
                if let Ok(title) = std::str::from_utf8(body) {
                    self.title = title.to_string();
                    on_event(EngineEvent::TitleChanged(self.title.clone()));
                }
            }
            1 => {
                if let Ok(name) = std::str::from_utf8(body) {
                    self.icon_name = name.to_string();
                    on_event(EngineEvent::IconNameChanged(self.icon_name.clone()));
                }
            }
            52 => {
                if let Some(pos) = body.iter().position(|&b| b == b';') {
                    let selection = body.first().copied().unwrap_or(b'c');
                    let payload = &body[pos + 1..];
                    on_event(EngineEvent::ClipboardSet {
                        selection,
                        data: payload.to_vec(),
                    });
                }
            }
            4 => self.osc_set_palette(body, out),
            11 => self.osc_set_default_bg(body, out),
            104 => self.osc_reset_palette(body),
            _ => {}
        }
    }

    /// OSC 4: `Ps;color` pairs (repeated by further `;Ps;color` groups)
    /// set palette entries; `Ps;?` queries one back as an `rgb:` spec.
    fn osc_set_palette(&mut self, body: &[u8], out: &mut Vec<u8>) {
        let mut fields = body.split(|&b| b == b';');
        loop {
            let Some(idx_bytes) = fields.next() else { break };
            let Some(spec_bytes) = fields.next() else { break };
            let Ok(index) = atoi_simd::parse::<u8>(idx_bytes) else {
                continue;
            };
            if spec_bytes == b"?" {
                if let Some(color) = self.palette_overrides.get(&index) {
                    out.extend_from_slice(format!("\x1b]4;{index};").as_bytes());
                    out.extend_from_slice(rgb_spec(*color).as_bytes());
                    out.extend_from_slice(b"\x07");
                }
                continue;
            }
            if let Ok(color) = XColor::try_from_bytes(spec_bytes) {
                let (r, g, b) = color.to_rgb8();
                self.palette_overrides.insert(index, Color::rgb(r, g, b));
            }
        }
    }

    /// OSC 11: sets (or, given `?`, reports) the default background.
    fn osc_set_default_bg(&mut self, body: &[u8], out: &mut Vec<u8>) {
        if body == b"?" {
            if let Some(color) = self.default_bg {
                out.extend_from_slice(b"\x1b]11;");
                out.extend_from_slice(rgb_spec(color).as_bytes());
                out.extend_from_slice(b"\x07");
            }
            return;
        }
        if let Ok(color) = XColor::try_from_bytes(body) {
            let (r, g, b) = color.to_rgb8();
            self.default_bg = Some(Color::rgb(r, g, b));
        }
    }

    /// OSC 104: reset the named palette entries, or every override if
    /// `body` is empty.
    fn osc_reset_palette(&mut self, body: &[u8]) {
        if body.is_empty() {
            self.palette_overrides.clear();
            return;
        }
        for idx_bytes in body.split(|&b| b == b';') {
            if let Ok(index) = atoi_simd::parse::<u8>(idx_bytes) {
                self.palette_overrides.remove(&index);
            }
        }
    }

    fn handle_dcs_start(&mut self, dcs: &DCS) {
        // Sixel graphics are explicitly out of scope: swallow the data
        // silently instead of printing it as text, matching a DCS that's
        // recognized-but-unsupported rather than one that's ignored for
        // being unrecognized.
        if dcs.final_byte == b'q' {
            self.modes.insert(Modes::SIXEL_STUB);
        }
    }
}

fn parse_params(csi: &vt_push_parser::event::CSI) -> smallvec::SmallVec<[i32; MAX_CSI_PARAMS]> {
    csi.params
        .iter()
        .map(|bytes| {
            if bytes.is_empty() {
                0
            } else {
                atoi_simd::parse::<i32>(bytes).unwrap_or(0)
            }
        })
        .collect()
}

fn param_or(params: &[i32], idx: usize, default: i32) -> i32 {
    match params.get(idx) {
        Some(&0) | None => default,
        Some(&v) => v,
    }
}

fn count(params: &[i32]) -> u16 {
    param_or(params, 0, 1).max(1) as u16
}

/// Parse the `5;n` (256-color) or `2;r;g;b` (truecolor) tail of an SGR
/// 38/48 extended-color sequence. Returns the color and how many
/// trailing params it consumed.
fn extended_color(rest: &[i32]) -> Option<(Color, usize)> {
    match rest.first() {
        Some(5) => rest.get(1).map(|&idx| (Color::palette(idx as u8), 2)),
        Some(2) => {
            if rest.len() >= 4 {
                Some((Color::rgb(rest[1] as u8, rest[2] as u8, rest[3] as u8), 4))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Format an `rgb:rrrr/gggg/bbbb` color spec (xterm's OSC 4/11 reply
/// format), doubling each 8-bit component into 16 bits.
fn rgb_spec(color: Color) -> String {
    let (r, g, b) = color.rgb8().unwrap_or((0, 0, 0));
    format!("rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}")
}

/// Encode a byte slice that may contain a trailing incomplete UTF-8
/// sequence, substituting [`crate::codec::UTF8_INVALID`] glyphs for
/// anything that won't decode. Exposed for callers (the pty pump) that
/// need to print PTY I/O in logs.
#[must_use]
pub fn escape_for_log(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        match b {
            0x1b => out.push_str("ESC"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("<{b:02x}>")),
        }
    }
    out
}

#[must_use]
pub fn reencode(cp: u32) -> Vec<u8> {
    let mut buf = [0u8; UTF8_MAX_LEN];
    let n = utf8encode(cp, &mut buf);
    buf[..n].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(term: &mut Terminal, s: &str) -> Vec<u8> {
        term.feed(s.as_bytes(), &mut |_| {})
    }

    #[test]
    fn plain_text_advances_cursor() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "hi");
        assert_eq!(term.screen().glyph(Cell::new(0, 0)).ch, 'h');
        assert_eq!(term.screen().glyph(Cell::new(1, 0)).ch, 'i');
        assert_eq!(term.screen().cursor().pos, Cell::new(2, 0));
    }

    #[test]
    fn linefeed_and_carriage_return() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "a\r\nb");
        assert_eq!(term.screen().glyph(Cell::new(0, 1)).ch, 'b');
    }

    #[test]
    fn cup_moves_cursor_one_indexed() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[3;4H");
        assert_eq!(term.screen().cursor().pos, Cell::new(3, 2));
    }

    #[test]
    fn sgr_bold_and_reset() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[1mx\x1b[0my");
        assert!(term.screen().glyph(Cell::new(0, 0)).attrs.contains(GlyphAttrs::BOLD));
        assert!(!term.screen().glyph(Cell::new(1, 0)).attrs.contains(GlyphAttrs::BOLD));
    }

    #[test]
    fn sgr_truecolor_foreground() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[38;2;10;20;30mx");
        assert_eq!(term.screen().glyph(Cell::new(0, 0)).fg.rgb8(), Some((10, 20, 30)));
    }

    #[test]
    fn osc_0_sets_title() {
        let mut term = Terminal::new(10, 5);
        let mut events = Vec::new();
        term.feed(b"\x1b]0;hello\x07", &mut |e| events.push(e));
        assert_eq!(term.title(), "hello");
        assert!(events.contains(&EngineEvent::TitleChanged("hello".to_string())));
    }

    #[test]
    fn dsr_cursor_position_report() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[5;5H");
        let out = term.feed(b"\x1b[6n", &mut |_| {});
        assert_eq!(out, b"\x1b[5;5R");
    }

    #[test]
    fn decset_1049_swaps_to_alt_screen_and_back() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "main");
        feed_str(&mut term, "\x1b[?1049h");
        assert!(term.modes().contains(Modes::ALT_SCREEN));
        feed_str(&mut term, "\x1b[?1049l");
        assert!(!term.modes().contains(Modes::ALT_SCREEN));
        assert_eq!(term.screen().glyph(Cell::new(0, 0)).ch, 'm');
    }

    #[test]
    fn decset_1006_selects_sgr_mouse_protocol() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[?1006h");
        assert_eq!(term.mouse_protocol(), MouseProtocol::Sgr);
    }

    #[test]
    fn unknown_escape_is_ignored_not_fatal() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1bZhello");
        assert_eq!(term.screen().glyph(Cell::new(0, 0)).ch, 'h');
    }

    #[test]
    fn osc4_sets_palette_entry() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b]4;1;rgb:ff00/0000/0000\x07");
        assert_eq!(term.palette_override(1), Some(Color::rgb(0xff, 0x00, 0x00)));
    }

    #[test]
    fn osc104_resets_palette_entry() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b]4;1;rgb:ff00/0000/0000\x07");
        feed_str(&mut term, "\x1b]104;1\x07");
        assert_eq!(term.palette_override(1), None);
    }

    #[test]
    fn osc11_sets_default_background() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b]11;rgb:0000/2020/4040\x07");
        assert_eq!(term.default_background(), Some(Color::rgb(0x00, 0x20, 0x40)));
    }

    #[test]
    fn mouse_report_is_none_when_protocol_off() {
        let term = Terminal::new(10, 5);
        use crate::event::keyboard::KeyModifiers;
        use crate::event::mouse::{MouseButton, MouseEventKind};
        assert_eq!(
            term.encode_mouse_event(MouseEventKind::Down(MouseButton::Left), 0, 0, KeyModifiers::NONE),
            None
        );
    }

    #[test]
    fn mouse_report_encodes_sgr_bytes() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[?1006h");
        use crate::event::keyboard::KeyModifiers;
        use crate::event::mouse::{MouseButton, MouseEventKind};
        let report = term
            .encode_mouse_event(MouseEventKind::Down(MouseButton::Left), 9, 4, KeyModifiers::NONE)
            .unwrap();
        assert_eq!(report, b"\x1b[<0;10;5M");
    }

    #[test]
    fn mouse_report_encodes_default_bytes_for_x10() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\x1b[?9h");
        use crate::event::keyboard::KeyModifiers;
        use crate::event::mouse::{MouseButton, MouseEventKind};
        let report = term
            .encode_mouse_event(MouseEventKind::Down(MouseButton::Left), 9, 4, KeyModifiers::NONE)
            .unwrap();
        assert_eq!(report, b"\x1b[M\x20\x2a\x25");
    }

    #[test]
    fn wide_char_sets_wide_and_wdummy() {
        let mut term = Terminal::new(10, 5);
        feed_str(&mut term, "\u{6c49}"); // a CJK ideograph, display width 2
        assert!(term.screen().glyph(Cell::new(0, 0)).attrs.contains(GlyphAttrs::WIDE));
        assert!(term.screen().glyph(Cell::new(1, 0)).attrs.contains(GlyphAttrs::WDUMMY));
        assert_eq!(term.screen().cursor().pos, Cell::new(2, 0));
    }

    #[test]
    fn wide_char_at_last_column_wraps_instead_of_splitting() {
        let mut term = Terminal::new(3, 3);
        feed_str(&mut term, "a\u{6c49}");
        // "a" occupies column 0; the wide char doesn't fit in the last
        // two columns as one cell, so it wraps to the next row whole.
        assert_eq!(term.screen().glyph(Cell::new(0, 0)).ch, 'a');
        assert!(term.screen().glyph(Cell::new(0, 1)).attrs.contains(GlyphAttrs::WIDE));
        assert!(term.screen().glyph(Cell::new(1, 1)).attrs.contains(GlyphAttrs::WDUMMY));
    }

    #[test]
    fn cbt_moves_back_to_previous_tabstop() {
        let mut term = Terminal::new(40, 5);
        feed_str(&mut term, "\x1b[20G"); // column 19 (0-based)
        feed_str(&mut term, "\x1b[Z"); // CBT, one stop back
        assert_eq!(term.screen().cursor().pos.col, 16);
    }

    #[test]
    fn tbc_clears_current_tabstop_then_cht_skips_it() {
        let mut term = Terminal::new(40, 5);
        feed_str(&mut term, "\x1b[9G"); // column 8, a default tab stop
        feed_str(&mut term, "\x1b[0g"); // TBC Ps=0: clear this tab stop
        feed_str(&mut term, "\x1b[1G\x1b[I"); // back to column 0, CHT once
        assert_eq!(term.screen().cursor().pos.col, 16);
    }

    #[test]
    fn hts_sets_a_new_tabstop() {
        let mut term = Terminal::new(40, 5);
        feed_str(&mut term, "\x1b[6G\x1bH"); // column 5, HTS
        feed_str(&mut term, "\x1b[1G\x1b[I"); // back to column 0, CHT once
        assert_eq!(term.screen().cursor().pos.col, 5);
    }

    #[test]
    fn bel_surfaces_as_engine_event() {
        let mut term = Terminal::new(10, 5);
        let mut bells = 0;
        term.feed(b"\x07", &mut |event| {
            if matches!(event, EngineEvent::Bell) {
                bells += 1;
            }
        });
        assert_eq!(bells, 1);
    }

    #[test]
    fn autowrap_then_write_moves_to_next_row() {
        let mut term = Terminal::new(3, 3);
        feed_str(&mut term, "abcd");
        assert_eq!(term.screen().glyph(Cell::new(0, 1)).ch, 'd');
    }
}
