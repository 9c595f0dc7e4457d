mod config;
mod logging;
mod sprite_loader;

use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Style, Stylize},
    text::Line,
};
use tessera_field::{Raster, SpriteSlot, TileField};
use tracing::{debug, info, warn};

use crate::config::Settings;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let settings = Settings::load()?;
    if let Some(path) = logging::init(&settings.log_filter) {
        info!(log = %path.display(), "tessera starting");
    }

    let sprite = sprite_loader::spawn(settings.sprite.clone());
    let terminal = ratatui::init();
    let result = run(terminal, settings, sprite);
    release_input(stdout());
    ratatui::restore();
    result
}

/// Turn off mouse capture and focus reporting. Failures are logged, not fatal,
/// so the terminal is still restored.
fn release_input(mut out: impl Write) -> bool {
    match execute!(out, DisableMouseCapture, DisableFocusChange) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "failed to release mouse capture");
            false
        }
    }
}

fn run(terminal: DefaultTerminal, settings: Settings, sprite: SpriteSlot) -> color_eyre::Result<()> {
    execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;
    let size = terminal.size()?;
    App::new(settings, sprite, size.width, size.height).run(terminal)
}

/// The main application which holds the tile field and its framebuffer.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    field: TileField,
    raster: Raster,
    sprite: SpriteSlot,
    frame_budget: Duration,
}

impl App {
    /// Construct a new instance of [`App`] for a terminal of `cols x rows` cells.
    pub fn new(settings: Settings, sprite: SpriteSlot, cols: u16, rows: u16) -> Self {
        let raster = Raster::for_cells(cols, rows);
        let mut field = TileField::new(
            settings.field,
            raster.width() as u32,
            raster.height() as u32,
        );
        field.set_speed(settings.speed);
        field.set_theme(settings.theme);

        Self {
            running: false,
            field,
            raster,
            sprite,
            frame_budget: settings.frame_budget(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            let frame_start = Instant::now();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_start + self.frame_budget)?;
        }
        info!("tessera exiting");
        Ok(())
    }

    /// Advance the tile field one frame and draw it with the help line.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.resize(area.width, area.height);

        let report = self
            .field
            .advance(Instant::now(), &self.sprite, &mut self.raster.painter());
        frame.render_widget(&self.raster, area);

        let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
        let help = Line::from(vec![
            "q".bold(),
            " quit  ".dark_gray(),
            "s".bold(),
            format!(" speed: {}  ", self.field.speed().label()).dark_gray(),
            "c".bold(),
            format!(" theme: {}", self.field.theme().label()).dark_gray(),
        ])
        .style(Style::new().white())
        .centered();
        frame.render_widget(help, chunks[1]);

        if report.evicted > 0 {
            debug!(evicted = report.evicted, tracked = report.tracked, "tile state trimmed");
        }
    }

    /// Keep the framebuffer and surface in step with the terminal size.
    fn resize(&mut self, cols: u16, rows: u16) {
        self.raster.resize(cols as usize, rows as usize * 2);
        self.field
            .resize(self.raster.width() as u32, self.raster.height() as u32);
    }

    /// Reads the crossterm events until `deadline` and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, deadline: Instant) -> color_eyre::Result<()> {
        let mut timeout = deadline.saturating_duration_since(Instant::now());
        while self.running && event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::FocusLost => self.field.pointer_left(),
                Event::Resize(cols, rows) => self.resize(cols, rows),
                _ => {}
            }
            timeout = deadline.saturating_duration_since(Instant::now());
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('s')) => self.cycle_speed(),
            (_, KeyCode::Char('c')) => self.cycle_theme(),
            _ => {}
        }
    }

    /// Forward pointer motion in surface-logical coordinates.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
            let (x, y) = self.cell_to_logical(mouse.column, mouse.row);
            self.field.pointer_moved(x, y);
        }
    }

    /// Logical coordinates of a terminal cell's center.
    fn cell_to_logical(&self, column: u16, row: u16) -> (f64, f64) {
        let ratio = self.field.surface().pixel_ratio();
        (
            (column as f64 + 0.5) / ratio,
            (row as f64 * 2.0 + 1.0) / ratio,
        )
    }

    /// Cycle through the scroll speed presets.
    fn cycle_speed(&mut self) {
        self.field.set_speed(self.field.speed().next());
    }

    /// Cycle through available color themes.
    fn cycle_theme(&mut self) {
        self.field.set_theme(self.field.theme().next());
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseButton};
    use tessera_core::{AnimationSpeed, ColorTheme};
    use tessera_field::Sprite;

    use super::*;

    fn app() -> App {
        App::new(Settings::default(), SpriteSlot::new(), 80, 24)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_surface_matches_terminal() {
        let app = app();
        let surface = app.field.surface();
        assert_eq!((surface.pixel_width(), surface.pixel_height()), (80, 48));
        assert_eq!(surface.logical_width(), 320.0);
    }

    #[test]
    fn test_quit_keys() {
        for event in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            app.running = true;
            app.on_key_event(event);
            assert!(!app.running);
        }
    }

    #[test]
    fn test_cycle_keys() {
        let mut app = app();
        app.running = true;
        app.on_key_event(key(KeyCode::Char('s'), KeyModifiers::NONE));
        app.on_key_event(key(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(app.running);
        assert_eq!(app.field.speed(), AnimationSpeed::Fast);
        assert_eq!(app.field.theme(), ColorTheme::Ocean);
    }

    #[test]
    fn test_mouse_maps_to_cell_center() {
        let mut app = app();
        app.on_mouse_event(mouse(MouseEventKind::Moved, 10, 3));
        let pointer = app.field.pointer();
        assert!(pointer.inside);
        assert_eq!((pointer.x, pointer.y), (42.0, 28.0));

        app.on_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0));
        assert_eq!((app.field.pointer().x, app.field.pointer().y), (2.0, 4.0));

        app.on_mouse_event(mouse(MouseEventKind::ScrollDown, 50, 20));
        assert_eq!(app.field.pointer().x, 2.0);
    }

    #[test]
    fn test_resize_reprovisions_surface() {
        let mut app = app();
        app.resize(40, 10);
        assert_eq!(app.raster.height(), 20);
        assert_eq!(app.field.surface().pixel_width(), 40);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_release_input_reports_failure() {
        let mut out = Vec::new();
        assert!(release_input(&mut out));
        assert!(!out.is_empty());
        assert!(!release_input(BrokenPipe));
    }

    #[test]
    fn test_frame_draws_into_raster() {
        let mut app = app();
        app.sprite.set(Sprite::builtin());
        let report = app
            .field
            .advance(Instant::now(), &app.sprite, &mut app.raster.painter());
        assert_eq!(report.drawn, report.visible);
        assert!(report.visible > 0);
    }
}
