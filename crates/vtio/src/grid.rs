//! The on-screen character grid: glyphs, cursor, scroll region, selection,
//! and the primary/alternate buffer pair.
//!
//! Scrollback is intentionally not modeled here: only the rows currently
//! on screen exist as addressable state, matching a plain `st`/`xterm`
//! style terminal rather than a scrollback-buffering one.

use bitflags::bitflags;
use vtreactor::Bus;

/// Published on a [`Screen`]'s bus whenever a row transitions from clean
/// to dirty, so an embedder watching for repaints doesn't have to poll
/// [`Screen::isdirty`] every row on every tick.
pub struct Refresh;

/// A zero-based screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cell {
    pub col: u16,
    pub row: u16,
}

impl Cell {
    #[must_use]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

bitflags! {
    /// Per-glyph display attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlyphAttrs: u16 {
        const BOLD      = 1 << 0;
        const FAINT     = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK     = 1 << 4;
        const REVERSE   = 1 << 5;
        const INVISIBLE = 1 << 6;
        const STRUCK    = 1 << 7;
        /// Set on the last column of a wrapped row.
        const WRAP      = 1 << 8;
        /// First cell of a double-width glyph.
        const WIDE      = 1 << 9;
        /// The phantom cell following a [`Self::WIDE`] glyph.
        const WDUMMY    = 1 << 10;
    }
}

/// A terminal color: either one of the 256 palette entries, or a 24-bit
/// truecolor value, distinguished by bit 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

const TRUECOLOR_BIT: u32 = 1 << 24;

impl Color {
    /// The implicit default foreground/background color (palette index 0).
    pub const DEFAULT: Self = Self(0);

    #[must_use]
    pub const fn palette(index: u8) -> Self {
        Self(index as u32)
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(TRUECOLOR_BIT | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    #[must_use]
    pub const fn is_truecolor(self) -> bool {
        self.0 & TRUECOLOR_BIT != 0
    }

    /// The palette index, if this is not a truecolor value.
    #[must_use]
    pub const fn palette_index(self) -> Option<u8> {
        if self.is_truecolor() {
            None
        } else {
            Some((self.0 & 0xFF) as u8)
        }
    }

    /// The `(r, g, b)` components, if this is a truecolor value.
    #[must_use]
    pub const fn rgb8(self) -> Option<(u8, u8, u8)> {
        if self.is_truecolor() {
            Some((
                ((self.0 >> 16) & 0xFF) as u8,
                ((self.0 >> 8) & 0xFF) as u8,
                (self.0 & 0xFF) as u8,
            ))
        } else {
            None
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The character occupying a single cell, plus its attributes and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub attrs: GlyphAttrs,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            attrs: GlyphAttrs::empty(),
            fg: Color::DEFAULT,
            bg: Color::DEFAULT,
        }
    }
}

bitflags! {
    /// Transient cursor state not part of the cursor's rendered attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CursorState: u8 {
        /// The next printable character should wrap to the next row first.
        const WRAP_NEXT = 1 << 0;
        /// Cursor motion is relative to the scroll region (DECOM).
        const ORIGIN = 1 << 1;
    }
}

/// Cursor appearance, set by DECSCUSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

/// Cursor position, pen attributes, and transient state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub pos: Cell,
    pub pen: Glyph,
    pub state: CursorState,
}

/// Which buffer is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Buffer {
    Primary,
    Alternate,
}

/// Text-selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    Regular,
    Rectangular,
}

/// How a selection was most recently extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSnap {
    None,
    Word,
    Line,
}

/// The span of selected text, tracked in both the order the user dragged
/// it (`orig`) and row/column-normalized order (`begin`/`end`).
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    active: bool,
    kind: SelectionType,
    snap: SelectionSnap,
    orig_start: Cell,
    orig_end: Cell,
    begin: Cell,
    end: Cell,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            active: false,
            kind: SelectionType::Regular,
            snap: SelectionSnap::None,
            orig_start: Cell::default(),
            orig_end: Cell::default(),
            begin: Cell::default(),
            end: Cell::default(),
        }
    }
}

impl Selection {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn kind(&self) -> SelectionType {
        self.kind
    }

    /// Begin a new selection anchored at `cell`.
    pub fn start(&mut self, cell: Cell, kind: SelectionType, snap: SelectionSnap) {
        self.active = true;
        self.kind = kind;
        self.snap = snap;
        self.orig_start = cell;
        self.orig_end = cell;
        self.normalize();
    }

    /// Extend the active selection to `cell`.
    pub fn extend_to(&mut self, cell: Cell) {
        if !self.active {
            return;
        }
        self.orig_end = cell;
        self.normalize();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Recompute `begin`/`end` in row/column order from `orig_start`/
    /// `orig_end`. Idempotent: calling it again with the same origin
    /// points yields the same normalized bounds.
    pub fn normalize(&mut self) {
        let (mut a, mut b) = (self.orig_start, self.orig_end);
        if (a.row, a.col) > (b.row, b.col) {
            std::mem::swap(&mut a, &mut b);
        }
        self.begin = a;
        self.end = b;
    }

    /// Whether `cell` falls within the normalized selection.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        if !self.active {
            return false;
        }
        match self.kind {
            SelectionType::Rectangular => {
                cell.row >= self.begin.row
                    && cell.row <= self.end.row
                    && cell.col >= self.begin.col
                    && cell.col <= self.end.col
            }
            SelectionType::Regular => {
                if cell.row < self.begin.row || cell.row > self.end.row {
                    return false;
                }
                if self.begin.row == self.end.row {
                    cell.col >= self.begin.col && cell.col <= self.end.col
                } else if cell.row == self.begin.row {
                    cell.col >= self.begin.col
                } else if cell.row == self.end.row {
                    cell.col <= self.end.col
                } else {
                    true
                }
            }
        }
    }

    /// Shift the selection by `n` rows (positive = up), dropping it
    /// entirely if it scrolls outside `[orig, orig + extent)`.
    pub fn scroll(&mut self, orig: u16, extent: u16, n: i32) {
        if !self.active {
            return;
        }
        let shift = |row: u16| -> Option<u16> {
            let shifted = i32::from(row) - n;
            if shifted < i32::from(orig) || shifted >= i32::from(orig) + i32::from(extent) {
                None
            } else {
                Some(shifted as u16)
            }
        };
        match (shift(self.orig_start.row), shift(self.orig_end.row)) {
            (Some(start_row), Some(end_row)) => {
                self.orig_start.row = start_row;
                self.orig_end.row = end_row;
                self.normalize();
            }
            _ => self.clear(),
        }
    }
}

/// The on-screen grid: the primary and alternate buffers, cursor, scroll
/// region, tab stops, and the active selection.
pub struct Screen {
    cols: u16,
    rows: u16,
    primary: Vec<Vec<Glyph>>,
    alternate: Vec<Vec<Glyph>>,
    active: Buffer,
    dirty: Vec<bool>,
    cursor: Cursor,
    stored_cursor: [Cursor; 2],
    tabstops: Vec<bool>,
    scroll_top: u16,
    scroll_bot: u16,
    cursor_style: CursorStyle,
    selection: Selection,
    bus: Bus,
}

const DEFAULT_TABSTOP: u16 = 8;

impl Screen {
    /// Build a screen of `cols` x `rows`, with the default 8-column tab
    /// stops and the whole rows range as the scroll region.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut screen = Self {
            cols: 0,
            rows: 0,
            primary: Vec::new(),
            alternate: Vec::new(),
            active: Buffer::Primary,
            dirty: Vec::new(),
            cursor: Cursor::default(),
            stored_cursor: [Cursor::default(), Cursor::default()],
            tabstops: Vec::new(),
            scroll_top: 0,
            scroll_bot: 0,
            cursor_style: CursorStyle::default(),
            selection: Selection::default(),
            bus: Bus::new(),
        };
        screen.resize(cols, rows);
        screen
    }

    /// The bus [`Refresh`] is published on. Subscribe here to be told
    /// when the screen has new dirty content to repaint.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Whether a horizontal tab stop is set at `col`.
    #[must_use]
    pub fn is_tabstop(&self, col: u16) -> bool {
        self.tabstops.get(col as usize).copied().unwrap_or(false)
    }

    /// HTS: set a tab stop at `col`.
    pub fn set_tabstop(&mut self, col: u16) {
        if let Some(slot) = self.tabstops.get_mut(col as usize) {
            *slot = true;
        }
    }

    /// TBC `Ps=0`: clear the tab stop at `col`.
    pub fn clear_tabstop(&mut self, col: u16) {
        if let Some(slot) = self.tabstops.get_mut(col as usize) {
            *slot = false;
        }
    }

    /// TBC `Ps=3`: clear every tab stop.
    pub fn clear_all_tabstops(&mut self) {
        self.tabstops.iter_mut().for_each(|t| *t = false);
    }

    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub const fn top(&self) -> u16 {
        self.scroll_top
    }

    #[must_use]
    pub const fn bot(&self) -> u16 {
        self.scroll_bot
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    #[must_use]
    pub fn stored_cursor(&self, idx: usize) -> &Cursor {
        &self.stored_cursor[idx & 1]
    }

    pub fn set_stored_cursor(&mut self, idx: usize, cursor: Cursor) {
        self.stored_cursor[idx & 1] = cursor;
    }

    #[must_use]
    pub const fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    fn active_mut(&mut self) -> &mut Vec<Vec<Glyph>> {
        match self.active {
            Buffer::Primary => &mut self.primary,
            Buffer::Alternate => &mut self.alternate,
        }
    }

    fn active_ref(&self) -> &Vec<Vec<Glyph>> {
        match self.active {
            Buffer::Primary => &self.primary,
            Buffer::Alternate => &self.alternate,
        }
    }

    /// Reset tab stops, scroll region, cursor, and clear both buffers.
    /// Does not change the grid size.
    pub fn reset(&mut self) {
        self.scroll_top = 0;
        self.scroll_bot = self.rows.saturating_sub(1);
        self.cursor = Cursor::default();
        self.stored_cursor = [Cursor::default(), Cursor::default()];
        self.reset_tabstops();
        self.primary = Self::blank_rows(self.cols, self.rows);
        self.alternate = Self::blank_rows(self.cols, self.rows);
        self.selection.clear();
        self.setdirty();
    }

    fn reset_tabstops(&mut self) {
        self.tabstops = (0..self.cols).map(|c| c > 0 && c % DEFAULT_TABSTOP == 0).collect();
    }

    fn blank_rows(cols: u16, rows: u16) -> Vec<Vec<Glyph>> {
        (0..rows).map(|_| vec![Glyph::default(); cols as usize]).collect()
    }

    /// Resize to `cols` x `rows`, preserving overlapping content and
    /// clamping the cursor and scroll region into the new bounds.
    ///
    /// If the cursor would land below the new row count, rows are first
    /// erased from the front of both buffers so the screen slides to
    /// keep the cursor's line on screen, rather than just clamping its
    /// row index and silently showing stale content underneath it.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 {
            return;
        }

        if self.cursor.pos.row >= rows {
            let erase = self.cursor.pos.row - rows + 1;
            for buf in [&mut self.primary, &mut self.alternate] {
                buf.drain(..(erase as usize).min(buf.len()));
            }
            self.cursor.pos.row -= erase;
        }

        for buf in [&mut self.primary, &mut self.alternate] {
            buf.resize_with(rows as usize, || vec![Glyph::default(); cols as usize]);
            for row in buf.iter_mut() {
                row.resize(cols as usize, Glyph::default());
            }
        }

        let grew_or_shrank_cols = cols != self.cols;
        self.cols = cols;
        self.rows = rows;

        if grew_or_shrank_cols || self.tabstops.len() != cols as usize {
            self.reset_tabstops();
        }

        self.scroll_top = self.scroll_top.min(rows.saturating_sub(1));
        self.scroll_bot = self.scroll_bot.min(rows.saturating_sub(1)).max(self.scroll_top);
        self.cursor.pos.col = self.cursor.pos.col.min(cols.saturating_sub(1));
        self.cursor.pos.row = self.cursor.pos.row.min(rows.saturating_sub(1));

        self.dirty = vec![true; rows as usize];
    }

    /// Switch to the other buffer, clearing whichever buffer becomes
    /// active (matches `st`'s "alternate screen is always blank on
    /// entry" behavior).
    pub fn swapscreen(&mut self) {
        self.active = match self.active {
            Buffer::Primary => Buffer::Alternate,
            Buffer::Alternate => Buffer::Primary,
        };
        self.clear();
    }

    #[must_use]
    pub fn glyph(&self, cell: Cell) -> Glyph {
        self.active_ref()[cell.row as usize][cell.col as usize]
    }

    pub fn set_glyph(&mut self, cell: Cell, glyph: Glyph) {
        self.active_mut()[cell.row as usize][cell.col as usize] = glyph;
        self.setdirty_row(cell.row);
    }

    /// Clear the whole active buffer to blank glyphs.
    pub fn clear(&mut self) {
        let cols = self.cols;
        let rows = self.rows;
        *self.active_mut() = Self::blank_rows(cols, rows);
        self.setdirty();
    }

    /// Clear the inclusive rectangular span `[begin, end]`.
    pub fn clear_range(&mut self, begin: Cell, end: Cell) {
        for row in begin.row..=end.row {
            let (from, to) = if row == begin.row && row == end.row {
                (begin.col, end.col)
            } else if row == begin.row {
                (begin.col, self.cols.saturating_sub(1))
            } else if row == end.row {
                (0, end.col)
            } else {
                (0, self.cols.saturating_sub(1))
            };
            for col in from..=to {
                self.set_glyph(Cell::new(col, row), Glyph::default());
            }
        }
    }

    /// Advance past the end of the current row, scrolling the region if
    /// the cursor is already on the last row of it.
    pub fn newline(&mut self, first_col: bool) {
        let row = self.cursor.pos.row;
        if row == self.scroll_bot {
            self.scrollup(self.scroll_top, 1);
        } else {
            self.cursor.pos.row = row + 1;
        }
        if first_col {
            self.cursor.pos.col = 0;
        }
        self.cursor.state.remove(CursorState::WRAP_NEXT);
    }

    /// Delete `n` lines starting at the cursor row, shifting rows below
    /// up within the scroll region.
    pub fn deleteline(&mut self, n: u16) {
        if self.cursor.pos.row >= self.scroll_top && self.cursor.pos.row <= self.scroll_bot {
            self.scrollup(self.cursor.pos.row, n);
        }
    }

    /// Insert `n` blank lines at the cursor row, pushing rows below down
    /// within the scroll region.
    pub fn insertblankline(&mut self, n: u16) {
        if self.cursor.pos.row >= self.scroll_top && self.cursor.pos.row <= self.scroll_bot {
            self.scrolldown(self.cursor.pos.row, n);
        }
    }

    /// Delete `n` characters starting at the cursor column, shifting the
    /// rest of the row left and filling the tail with blanks.
    pub fn deletechar(&mut self, n: u16) {
        let row = self.cursor.pos.row;
        let col = self.cursor.pos.col as usize;
        let n = n as usize;
        let cols = self.cols as usize;
        let line = &mut self.active_mut()[row as usize];
        if col >= cols {
            return;
        }
        let keep_from = (col + n).min(cols);
        line.copy_within(keep_from..cols, col);
        for cell in &mut line[cols.saturating_sub(n.min(cols - col))..cols] {
            *cell = Glyph::default();
        }
        self.setdirty_row(row);
    }

    /// Insert `n` blanks at the cursor column, shifting the rest of the
    /// row right and truncating anything pushed past the last column.
    pub fn insertblank(&mut self, n: u16) {
        let row = self.cursor.pos.row;
        let col = self.cursor.pos.col as usize;
        let n = (n as usize).min(self.cols as usize);
        let cols = self.cols as usize;
        let line = &mut self.active_mut()[row as usize];
        if col >= cols {
            return;
        }
        let move_to = (col + n).min(cols);
        line.copy_within(col..cols.saturating_sub(n), move_to);
        for cell in &mut line[col..move_to] {
            *cell = Glyph::default();
        }
        self.setdirty_row(row);
    }

    /// Set the scroll region to `[top, bot]`, clamped into the grid.
    pub fn setscroll(&mut self, top: u16, bot: u16) {
        let top = top.min(self.rows.saturating_sub(1));
        let bot = bot.min(self.rows.saturating_sub(1));
        if top <= bot {
            self.scroll_top = top;
            self.scroll_bot = bot;
        }
    }

    /// Scroll the region starting at `orig` up by `n` rows: rows
    /// `[orig, orig+n)` are discarded and `n` blank rows appear at the
    /// bottom of the region.
    pub fn scrollup(&mut self, orig: u16, n: u16) {
        let bot = self.scroll_bot;
        let n = n.min(bot.saturating_sub(orig) + 1);
        let buf = self.active_mut();
        buf[orig as usize..=bot as usize].rotate_left(n as usize);
        for row in (bot - n + 1)..=bot {
            buf[row as usize].iter_mut().for_each(|g| *g = Glyph::default());
        }
        self.setdirty_range(orig, bot);
        self.selection.scroll(orig, bot - orig + 1, i32::from(n));
    }

    /// Scroll the region starting at `orig` down by `n` rows: `n` blank
    /// rows appear at `orig` and the bottom `n` rows of the region are
    /// discarded.
    pub fn scrolldown(&mut self, orig: u16, n: u16) {
        let bot = self.scroll_bot;
        let n = n.min(bot.saturating_sub(orig) + 1);
        let buf = self.active_mut();
        buf[orig as usize..=bot as usize].rotate_right(n as usize);
        for row in orig..(orig + n) {
            buf[row as usize].iter_mut().for_each(|g| *g = Glyph::default());
        }
        self.setdirty_range(orig, bot);
        self.selection.scroll(orig, bot - orig + 1, -i32::from(n));
    }

    /// Move the cursor to `cell`, clamped into the grid bounds.
    pub fn moveto(&mut self, cell: Cell) {
        self.cursor.pos.col = cell.col.min(self.cols.saturating_sub(1));
        self.cursor.pos.row = cell.row.min(self.rows.saturating_sub(1));
        self.cursor.state.remove(CursorState::WRAP_NEXT);
    }

    /// Move the cursor to `cell`, interpreted relative to the scroll
    /// region when `CursorState::ORIGIN` (DECOM) is set.
    pub fn moveato(&mut self, cell: Cell) {
        let row = if self.cursor.state.contains(CursorState::ORIGIN) {
            cell.row + self.scroll_top
        } else {
            cell.row
        };
        self.moveto(Cell::new(cell.col, row));
    }

    /// Number of non-blank columns in `row`, ignoring trailing blanks
    /// unless the row is wrapped.
    #[must_use]
    pub fn linelen(&self, row: u16) -> u16 {
        let line = &self.active_ref()[row as usize];
        if line.last().is_some_and(|g| g.attrs.contains(GlyphAttrs::WRAP)) {
            return self.cols;
        }
        let mut len = line.len();
        while len > 0 && line[len - 1].ch == ' ' {
            len -= 1;
        }
        len as u16
    }

    #[must_use]
    pub fn isdirty(&self, row: u16) -> bool {
        self.dirty[row as usize]
    }

    pub fn setdirty(&mut self) {
        let changed = self.dirty.iter().any(|d| !d);
        self.dirty.iter_mut().for_each(|d| *d = true);
        if changed {
            self.bus.publish(&Refresh);
        }
    }

    pub fn setdirty_row(&mut self, row: u16) {
        if !self.dirty[row as usize] {
            self.dirty[row as usize] = true;
            self.bus.publish(&Refresh);
        }
    }

    pub fn setdirty_range(&mut self, top: u16, bot: u16) {
        let changed = (top..=bot).any(|row| !self.dirty[row as usize]);
        for row in top..=bot {
            self.dirty[row as usize] = true;
        }
        if changed {
            self.bus.publish(&Refresh);
        }
    }

    pub fn cleardirty(&mut self, row: u16) {
        self.dirty[row as usize] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_preserves_shape() {
        let mut screen = Screen::new(80, 24);
        screen.resize(100, 40);
        assert_eq!(screen.cols(), 100);
        assert_eq!(screen.rows(), 40);
        assert_eq!(screen.bot(), 39);
    }

    #[test]
    fn resize_clamps_cursor_into_bounds() {
        let mut screen = Screen::new(80, 24);
        screen.moveto(Cell::new(79, 23));
        screen.resize(10, 10);
        assert!(screen.cursor().pos.col < 10);
        assert!(screen.cursor().pos.row < 10);
    }

    #[test]
    fn resize_slides_content_to_keep_cursor_row_onscreen() {
        let mut screen = Screen::new(10, 24);
        screen.moveto(Cell::new(0, 20));
        screen.set_glyph(Cell::new(0, 20), Glyph { ch: 'x', ..Glyph::default() });
        screen.resize(10, 10);
        assert_eq!(screen.cursor().pos.row, 9);
        // row 20 slid up to become the new last row, 9.
        assert_eq!(screen.glyph(Cell::new(0, 9)).ch, 'x');
    }

    #[test]
    fn scrollup_then_scrolldown_restores_shape() {
        let mut screen = Screen::new(10, 5);
        screen.set_glyph(Cell::new(0, 0), Glyph { ch: 'a', ..Glyph::default() });
        screen.scrollup(0, 2);
        screen.scrolldown(0, 2);
        // content scrolled off is not expected back, but shape is intact.
        assert_eq!(screen.rows(), 5);
        assert_eq!(screen.glyph(Cell::new(0, 4)).ch, ' ');
    }

    #[test]
    fn selection_normalize_is_idempotent() {
        let mut sel = Selection::default();
        sel.start(Cell::new(5, 2), SelectionType::Regular, SelectionSnap::None);
        sel.extend_to(Cell::new(1, 0));
        let first = (sel.begin, sel.end);
        sel.normalize();
        assert_eq!((sel.begin, sel.end), first);
        assert_eq!(sel.begin, Cell::new(1, 0));
        assert_eq!(sel.end, Cell::new(5, 2));
    }

    #[test]
    fn selection_scroll_drops_out_of_range() {
        let mut sel = Selection::default();
        sel.start(Cell::new(0, 1), SelectionType::Regular, SelectionSnap::None);
        sel.extend_to(Cell::new(5, 1));
        sel.scroll(0, 3, 5);
        assert!(!sel.is_active());
    }

    #[test]
    fn isdirty_toggles() {
        let mut screen = Screen::new(10, 3);
        screen.cleardirty(0);
        assert!(!screen.isdirty(0));
        screen.setdirty_row(0);
        assert!(screen.isdirty(0));
    }

    #[test]
    fn setdirty_row_publishes_refresh_on_clean_to_dirty_edge() {
        let mut screen = Screen::new(10, 3);
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let c = count.clone();
        screen.bus_mut().subscribe::<Refresh>(move |_: &Refresh| c.set(c.get() + 1));

        screen.cleardirty(0);
        screen.setdirty_row(0);
        assert_eq!(count.get(), 1);

        // Already dirty: no further publish.
        screen.setdirty_row(0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clear_range_publishes_refresh_via_setdirty_row() {
        let mut screen = Screen::new(10, 3);
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let c = count.clone();
        screen.bus_mut().subscribe::<Refresh>(move |_: &Refresh| c.set(c.get() + 1));
        for row in 0..3 {
            screen.cleardirty(row);
        }

        screen.clear_range(Cell::new(0, 0), Cell::new(9, 0));
        assert!(count.get() > 0);
    }
}
