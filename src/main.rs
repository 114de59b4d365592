// SPDX-License-Identifier: MIT
//
// tessel demo — a multi-screen tour of the terminal UI crates.
//
// Wires the complete pipeline: MainLoop (epoll + signalfd + eventfd) →
// Terminal (raw tty, cell grid) → painters → publisher. Run it, press
// keys, resize the window. Esc, q or Ctrl+C to quit; an uncaught SIGINT
// or SIGTERM exits with the signal number.
//
// Screens:
//   0 / h  help
//   1      text effects
//   2      palette colors
//   3      RGB gradient, foreground (any other key cycles the glyph)
//   4      RGB gradient, background
//   5      live event viewer
//   6      markdown / inline formatting

use std::cell::RefCell;
use std::collections::VecDeque;
use std::process;
use std::rc::Rc;

use tessel_loop::{MainLoop, Result, Terminator};
use tessel_term::buffer::Alignment;
use tessel_term::cell::Effect;
use tessel_term::color::Color;
use tessel_term::event::Event;
use tessel_term::format;
use tessel_term::terminal::{App, Terminal};

/// Glyphs the gradient screens cycle through.
const FILL_GLYPHS: &[char] = &['█', '▓', '▒', '░', '#', 'o', '·'];

/// How many events the viewer screen retains.
const EVENT_LOG_LIMIT: usize = 64;

// ─── Demo application ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Help,
    Effects,
    Palette,
    GradientFg,
    GradientBg,
    Events,
    Markdown,
}

struct Demo {
    screen: Screen,
    fill: usize,
    log: VecDeque<String>,
    terminator: Terminator,
}

impl Demo {
    fn new(terminator: Terminator) -> Self {
        Self {
            screen: Screen::Help,
            fill: 0,
            log: VecDeque::new(),
            terminator,
        }
    }

    fn switch(&mut self, term: &mut Terminal, screen: Screen) -> Result<()> {
        self.screen = screen;
        term.reset()?;
        self.on_draw(term)
    }

    fn push_log(&mut self, event: Event) {
        if self.log.len() >= EVENT_LOG_LIMIT {
            self.log.pop_front();
        }
        self.log.push_back(describe(event));
    }

    // ── Screens ──────────────────────────────────────────────────────

    fn draw_help(term: &mut Terminal) -> &'static str {
        let ctx = term.frame().default_ctx();
        let mut line = 2;
        for text in [
            "You can use the following keys to go through the demo:",
            "- Esc / q / Ctrl+C : quit the demo",
            "- 0 / h : this help screen",
            "- 1 : text effects",
            "- 2 : palette colors",
            "- 3 : RGB gradient foreground. Any other key changes the glyph.",
            "- 4 : RGB gradient background. Any other key changes the glyph.",
            "- 5 : keyboard demo: displays the captured events",
            "- 6 : markdown and inline formatting",
        ] {
            term.add_string_ctx(line, 0, text, &ctx);
            line += 1;
        }
        term.add_string_ctx(
            line + 1,
            0,
            "You can also resize the window at any moment to see the refresh.",
            &ctx,
        );
        "help"
    }

    fn draw_effects(term: &mut Terminal) -> &'static str {
        let ctx = term.frame().default_ctx();
        let mut line = 2;
        for (text, effect) in [
            ("With default color, normal text", Effect::empty()),
            ("Bold text (may appear brighter)", Effect::BOLD),
            ("Italic text", Effect::ITALIC),
            ("Underline text", Effect::UNDERLINE),
            ("Blinking text", Effect::BLINK),
            ("Reversed-video text", Effect::REVERSE_VIDEO),
            ("Concealed text", Effect::CONCEAL),
            ("Crossed-out text", Effect::CROSSED_OUT),
        ] {
            term.add_string(line, 0, text, ctx.fg, ctx.bg, effect);
            line += 1;
        }

        line += 1;
        let blue = Color::Palette(27);
        let black = Color::Palette(0);
        for (text, effect) in [
            ("With fixed foreground color, normal text", Effect::empty()),
            ("Bold text (not brighter as color is fixed)", Effect::BOLD),
            ("Underline text", Effect::UNDERLINE),
            ("Reversed-video text", Effect::REVERSE_VIDEO),
        ] {
            term.add_string(line, 0, text, blue, black, effect);
            line += 1;
        }
        "text effects"
    }

    fn draw_palette(term: &mut Terminal) -> &'static str {
        let ctx = term.frame().default_ctx();
        let black = Color::Palette(0);
        let white = Color::Palette(15);
        let mut line = 2;

        term.add_string_ctx(line, 0, "Standard colors", &ctx);
        line += 1;
        for column in 0..8_u8 {
            palette_swatch(term, line, column, column, white);
        }
        line += 2;

        term.add_string_ctx(line, 0, "High-intensity colors", &ctx);
        line += 1;
        for column in 0..8_u8 {
            palette_swatch(term, line, column, 8 + column, black);
        }
        line += 2;

        term.add_string_ctx(line, 0, "216 colors", &ctx);
        line += 1;
        for row in 0..6_u8 {
            for column in 0..18_u8 {
                palette_swatch(term, line, column, 16 + 36 * row + column, white);
            }
            line += 1;
        }
        for row in 0..6_u8 {
            for column in 0..18_u8 {
                palette_swatch(term, line, column, 16 + 36 * row + 18 + column, black);
            }
            line += 1;
        }
        line += 1;

        term.add_string_ctx(line, 0, "24 grey shades", &ctx);
        line += 1;
        for column in 0..12_u8 {
            palette_swatch(term, line, column, 232 + column, white);
        }
        line += 1;
        for column in 0..12_u8 {
            palette_swatch(term, line, column, 244 + column, black);
        }
        "palette colors"
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    fn draw_gradient(&self, term: &mut Terminal, foreground: bool) -> &'static str {
        let width = term.width().max(1);
        let height = term.height().max(2);
        let glyph = FILL_GLYPHS[self.fill % FILL_GLYPHS.len()];

        for y in 0..height - 1 {
            for x in 0..width {
                let hue = 360.0 * x as f32 / width as f32;
                let value = 1.0 - y as f32 / height as f32;
                let color = Color::from_hsv(hue, 1.0, value);
                if foreground {
                    term.add_glyph(
                        y as i32,
                        x as i32,
                        glyph,
                        color,
                        Color::Palette(0),
                        Effect::empty(),
                    );
                } else {
                    term.add_glyph(
                        y as i32,
                        x as i32,
                        glyph,
                        Color::Palette(15),
                        color,
                        Effect::empty(),
                    );
                }
            }
        }
        if foreground {
            "gradient fg"
        } else {
            "gradient bg"
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn draw_events(&self, term: &mut Terminal) -> &'static str {
        let ctx = term.frame().default_ctx();
        term.add_string_ctx(2, 0, "Captured events, most recent last:", &ctx);
        let visible = term.height().saturating_sub(6);
        let skip = self.log.len().saturating_sub(visible);
        for (i, entry) in self.log.iter().skip(skip).enumerate() {
            term.add_string_ctx(4 + i as i32, 2, entry, &ctx);
        }
        "events"
    }

    fn draw_markdown(term: &mut Terminal) -> &'static str {
        let width = term.width();
        term.add_markdown(
            2,
            0,
            "Inline markup: **bold**, //italic//, __underline__, --crossed out--.\n\
             Pairs toggle: **bold **still bold** bold again**.\n\
             \n\
             Lone delimiters stay literal: a*b, path/to/file, snake_case, x-y.",
            width,
        );

        // The same machinery, driven directly with format tokens.
        let mut formatted = Vec::new();
        format::push_str(&mut formatted, "Formatted strings can switch ");
        formatted.push(format::fg_token(Color::Palette(202)));
        format::push_str(&mut formatted, "colors");
        formatted.push(format::fg_token(Color::DEFAULT_FG));
        format::push_str(&mut formatted, " and ");
        formatted.push(format::effect_token(Effect::BOLD));
        format::push_str(&mut formatted, "effects");
        formatted.push(format::effect_token(Effect::empty()));
        format::push_str(&mut formatted, " mid-line.");
        term.add_formatted_string(7, 0, &formatted, width);
        "markdown"
    }

    /// Footer: screen name left, key hint centered, size right.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn draw_footer(&self, term: &mut Terminal, title: &str) {
        let width = term.width();
        let last_row = term.height() as i32 - 1;
        let size = format!("{}x{}", term.width(), term.height());
        term.add_strings_n(
            last_row,
            0,
            title,
            "q to quit, 0-6 for screens",
            &size,
            width,
            Color::Palette(0),
            Color::Palette(7),
            Effect::empty(),
        );
    }
}

impl App for Demo {
    fn on_draw(&mut self, term: &mut Terminal) -> Result<()> {
        let title = match self.screen {
            Screen::Help => Self::draw_help(term),
            Screen::Effects => Self::draw_effects(term),
            Screen::Palette => Self::draw_palette(term),
            Screen::GradientFg => self.draw_gradient(term, true),
            Screen::GradientBg => self.draw_gradient(term, false),
            Screen::Events => self.draw_events(term),
            Screen::Markdown => Self::draw_markdown(term),
        };
        self.draw_footer(term, title);
        term.publish()
    }

    fn on_event(&mut self, term: &mut Terminal, event: Event) -> Result<()> {
        if self.screen == Screen::Events {
            self.push_log(event);
        }

        match event.glyph() {
            Some('q') => {
                self.terminator.request_termination(0);
                return Ok(());
            }
            Some('0') | Some('h') => return self.switch(term, Screen::Help),
            Some('1') => return self.switch(term, Screen::Effects),
            Some('2') => return self.switch(term, Screen::Palette),
            Some('3') => return self.switch(term, Screen::GradientFg),
            Some('4') => return self.switch(term, Screen::GradientBg),
            Some('5') => return self.switch(term, Screen::Events),
            Some('6') => return self.switch(term, Screen::Markdown),
            _ => {}
        }
        if event == Event::ESCAPE || event == Event::CTRL_C {
            self.terminator.request_termination(0);
            return Ok(());
        }

        // Remaining keys are screen-local.
        match self.screen {
            Screen::GradientFg | Screen::GradientBg => {
                self.fill = (self.fill + 1) % FILL_GLYPHS.len();
                term.reset()?;
                self.on_draw(term)
            }
            Screen::Events => {
                term.reset()?;
                self.on_draw(term)
            }
            _ => Ok(()),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Width of one palette swatch on the palette screen.
const SWATCH_WIDTH: usize = 6;

/// One centered palette-index label on its own palette background.
#[allow(clippy::cast_possible_wrap)]
fn palette_swatch(term: &mut Terminal, line: i32, column: u8, index: u8, fg: Color) {
    term.add_string_n(
        line,
        i32::from(column) * SWATCH_WIDTH as i32,
        &index.to_string(),
        SWATCH_WIDTH,
        Alignment::CENTERED,
        fg,
        Color::Palette(index),
        Effect::empty(),
    );
}

/// Human-readable event description for the viewer screen.
fn describe(event: Event) -> String {
    let named = match event {
        Event::ENTER => Some("Enter"),
        Event::TAB => Some("Tab"),
        Event::BACKSPACE => Some("Backspace"),
        Event::ESCAPE => Some("Escape"),
        Event::ARROW_UP => Some("ArrowUp"),
        Event::ARROW_DOWN => Some("ArrowDown"),
        Event::ARROW_RIGHT => Some("ArrowRight"),
        Event::ARROW_LEFT => Some("ArrowLeft"),
        Event::INSERT => Some("Insert"),
        Event::DELETE => Some("Delete"),
        Event::END => Some("End"),
        Event::HOME => Some("Home"),
        Event::PAGE_UP => Some("PageUp"),
        Event::PAGE_DOWN => Some("PageDown"),
        Event::KEYPAD_CENTER => Some("KeypadCenter"),
        Event::SHIFT_ENTER => Some("Shift+Enter"),
        Event::SHIFT_TAB => Some("Shift+Tab"),
        _ => None,
    };
    if let Some(name) = named {
        return name.to_owned();
    }

    let mut out = String::new();
    if event.is_ctrl() {
        out.push_str("Ctrl+");
    }
    if event.is_alt() {
        out.push_str("Alt+");
    }
    if event.is_shift() {
        out.push_str("Shift+");
    }
    if event.is_special() {
        let payload = event.payload();
        if (0x101..=0x10C).contains(&payload) {
            out.push_str(&format!("F{}", payload - 0x100));
        } else {
            out.push_str(&format!("special 0x{payload:x}"));
        }
    } else if let Some(glyph) = char::from_u32(event.payload()) {
        if glyph.is_control() {
            out.push_str(&format!("0x{:02x}", event.payload()));
        } else {
            out.push(glyph);
        }
    } else {
        out.push_str(&format!("0x{:x}", event.value()));
    }
    out
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn run() -> Result<i32> {
    let mut main_loop = MainLoop::new()?;
    main_loop.set_signals(&[libc::SIGINT, libc::SIGTERM, libc::SIGWINCH])?;

    let terminal = Terminal::new()?;
    let app = Rc::new(RefCell::new(Demo::new(main_loop.terminator())));
    let _terminal = terminal.attach(&mut main_loop, app)?;

    main_loop.run_forever()
}

fn main() {
    match run() {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("tessel-demo: {err}");
            process::exit(1);
        }
    }
}
