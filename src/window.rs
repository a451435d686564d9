use {
    crate::{Error, estimator::Utilization, meter::Meter},
    crossterm::{
        ExecutableCommand, QueueableCommand, cursor,
        event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        style::{self, Stylize},
        terminal,
    },
    futures::StreamExt,
    std::{
        io::{self, Write},
        iter::repeat_n,
    },
    tokio::sync::watch,
    tracing::{debug, info},
};

/// a bordered panel, holding a [`Meter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    cols: u16,
    rows: u16,
    meter: Meter,
}

/// the terminal, held in raw mode on the alternate screen until dropped.
struct Terminal<W: Write = io::Stdout, R: RawMode = CrosstermRawMode> {
    stdout: W,
    raw: R,
}

/// switches the terminal's raw mode on and off.
trait RawMode {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
}

/// raw mode for the controlling terminal.
struct CrosstermRawMode;

/// shows the latest utilization until the user quits, or the sampler stops.
pub(crate) async fn show(mut utilization: watch::Receiver<Utilization>) -> Result<(), Error> {
    let mut screen = Terminal::enter(io::stdout(), CrosstermRawMode)?;
    let (cols, rows) = terminal::size()?;
    let mut panel = Panel::new(cols, rows);
    panel.set_utilization(*utilization.borrow_and_update());
    panel.draw(&mut screen.stdout)?;

    let mut events = EventStream::new();
    loop {
        tokio::select! {
            changed = utilization.changed() => {
                if changed.is_err() {
                    info!("cpu sampler went away");
                    break;
                }
                let latest = *utilization.borrow_and_update();
                if panel.set_utilization(latest) {
                    panel.draw(&mut screen.stdout)?;
                }
            }
            event = events.next() => match event {
                Some(Ok(Event::Resize(cols, rows))) => {
                    debug!(cols, rows, "terminal resized");
                    if panel.resize(cols, rows) {
                        screen.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
                        panel.draw(&mut screen.stdout)?;
                    }
                }
                Some(Ok(Event::Key(key))) if is_quit(&key) => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => return Err(error.into()),
                None => break,
            },
        }
    }

    Ok(())
}

fn is_quit(
    &KeyEvent {
        code,
        modifiers,
        kind,
        ..
    }: &KeyEvent,
) -> bool {
    if kind != KeyEventKind::Press {
        return false;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// === impl Panel ===

impl Panel {
    const TITLE: &str = " CPU Usage ";

    pub fn new(cols: u16, rows: u16) -> Self {
        let (width, height) = Self::inner(cols, rows);
        Self {
            cols,
            rows,
            meter: Meter::new(width, height),
        }
    }

    /// updates the displayed value, returning true if a redraw is needed.
    pub fn set_utilization(&mut self, utilization: Utilization) -> bool {
        self.meter.set_utilization(utilization)
    }

    /// updates the size of the panel, returning true if a redraw is needed.
    pub fn resize(&mut self, cols: u16, rows: u16) -> bool {
        let (width, height) = Self::inner(cols, rows);
        (self.cols, self.rows) = (cols, rows);
        self.meter.resize(width, height)
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    /// draws the panel, and flushes the writer.
    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        self.border(writer)?;
        self.title(writer)?;
        self.meter.draw(writer, (1, 1))?;
        writer.queue(cursor::Hide)?;
        writer.flush()
    }

    /// returns the area inside of the border.
    fn inner(cols: u16, rows: u16) -> (u16, u16) {
        (cols.saturating_sub(2), rows.saturating_sub(2))
    }

    fn border(&self, writer: &mut impl Write) -> io::Result<()> {
        let Self { cols, rows, .. } = *self;
        if cols < 2 || rows < 2 {
            return Ok(());
        }

        let span = repeat_n('─', usize::from(cols - 2)).collect::<String>();
        writer
            .queue(cursor::MoveTo(0, 0))?
            .queue(style::PrintStyledContent(format!("┌{span}┐").grey()))?;
        for y in 1..rows - 1 {
            writer
                .queue(cursor::MoveTo(0, y))?
                .queue(style::PrintStyledContent("│".grey()))?
                .queue(cursor::MoveTo(cols - 1, y))?
                .queue(style::PrintStyledContent("│".grey()))?;
        }
        writer
            .queue(cursor::MoveTo(0, rows - 1))?
            .queue(style::PrintStyledContent(format!("└{span}┘").grey()))?;

        Ok(())
    }

    /// centers the title on the top edge, if it fits.
    fn title(&self, writer: &mut impl Write) -> io::Result<()> {
        let len = Self::TITLE.chars().count() as u16;
        let Some(spare) = self.cols.checked_sub(len + 2) else {
            return Ok(());
        };

        writer
            .queue(cursor::MoveTo(1 + spare / 2, 0))?
            .queue(style::PrintStyledContent(Self::TITLE.bold()))?;

        Ok(())
    }
}

// === impl Terminal ===

impl<W: Write, R: RawMode> Terminal<W, R> {
    /// enables raw mode and switches to the alternate screen.
    ///
    /// once raw mode is on, the guard exists, so a failure past that point still restores it.
    fn enter(stdout: W, mut raw: R) -> io::Result<Self> {
        raw.enable()?;
        let mut screen = Self { stdout, raw };
        screen
            .stdout
            .execute(terminal::EnterAlternateScreen)?
            .execute(cursor::Hide)?;
        Ok(screen)
    }
}

impl<W: Write, R: RawMode> Drop for Terminal<W, R> {
    fn drop(&mut self) {
        let Self { stdout, raw } = self;
        let _ = stdout
            .execute(cursor::Show)
            .and_then(|stdout| stdout.execute(terminal::LeaveAlternateScreen));
        let _ = raw.disable();
    }
}

// === impl CrosstermRawMode ===

impl RawMode for CrosstermRawMode {
    fn enable(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::{cell::Cell, rc::Rc},
    };

    /// records whether raw mode is on.
    #[derive(Clone, Default)]
    struct MockRawMode(Rc<Cell<bool>>);

    impl RawMode for MockRawMode {
        fn enable(&mut self) -> io::Result<()> {
            self.0.set(true);
            Ok(())
        }

        fn disable(&mut self) -> io::Result<()> {
            self.0.set(false);
            Ok(())
        }
    }

    /// a writer whose every write fails.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    fn render(panel: &Panel) -> String {
        let mut out = Vec::new();
        panel.draw(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn meter_fills_the_inside_of_the_border() {
        let panel = Panel::new(20, 12);
        assert_eq!(panel.meter().height(), 10);
    }

    #[test]
    fn tiny_panels_have_no_meter() {
        let panel = Panel::new(1, 1);
        assert_eq!(panel.meter().height(), 0);
        assert!(!render(&panel).contains('┌'));
    }

    #[test]
    fn draws_a_titled_border() {
        let out = render(&Panel::new(20, 12));
        assert!(out.contains(Panel::TITLE));
        assert!(out.contains('┌'));
        assert!(out.contains('┘'));
    }

    #[test]
    fn narrow_panels_omit_the_title() {
        let out = render(&Panel::new(8, 12));
        assert!(!out.contains(Panel::TITLE));
        assert!(out.contains('┌'));
    }

    #[test]
    fn resize_redraws_without_a_new_sample() {
        let mut panel = Panel::new(20, 12);
        assert!(panel.set_utilization(Utilization::new(0.5)));
        assert_eq!(panel.meter().filled_rows(), 5);

        assert!(panel.resize(20, 22));
        assert_eq!(panel.meter().filled_rows(), 10);
        assert!(!panel.resize(20, 22));
    }

    #[test]
    fn unchanged_utilization_needs_no_redraw() {
        let mut panel = Panel::new(20, 12);
        assert!(panel.set_utilization(Utilization::new(0.25)));
        assert!(!panel.set_utilization(Utilization::new(0.25)));
    }

    #[test]
    fn quit_keys() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_quit(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&key(KeyCode::Char('x'), KeyModifiers::NONE)));
    }

    #[test]
    fn failed_entry_leaves_raw_mode() {
        let raw = MockRawMode::default();
        assert!(Terminal::enter(BrokenPipe, raw.clone()).is_err());
        assert!(!raw.0.get());
    }

    #[test]
    fn dropping_the_terminal_restores_it() {
        let raw = MockRawMode::default();
        let screen = Terminal::enter(Vec::new(), raw.clone()).unwrap();
        assert!(raw.0.get());

        drop(screen);
        assert!(!raw.0.get());
    }
}
