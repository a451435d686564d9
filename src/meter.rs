use {
    crate::estimator::Utilization,
    crossterm::{QueueableCommand, cursor, style},
    std::{
        io::{self, Write},
        iter::repeat_n,
    },
};

/// a vertical bar, filled from the bottom up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meter {
    /// the value being displayed.
    utilization: Utilization,
    /// the number of columns available to the bar.
    width: u16,
    /// the number of rows available to the bar.
    height: u16,
}

/// === impl Meter ===

impl Meter {
    const ACTIVE: char = '█';
    const IDLE: char = ' ';

    pub fn new(width: u16, height: u16) -> Self {
        Self {
            utilization: Utilization::ZERO,
            width,
            height,
        }
    }

    /// updates the displayed value, returning true if it changed.
    pub fn set_utilization(&mut self, utilization: Utilization) -> bool {
        std::mem::replace(&mut self.utilization, utilization) != utilization
    }

    /// updates the available area, returning true if it changed.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        let changed = (self.width, self.height) != (width, height);
        self.width = width;
        self.height = height;
        changed
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// returns the number of rows that should be filled in.
    ///
    /// this is always within `0..=height`. values outside of `[0, 1]` are clamped, and values
    /// that are not finite are treated as zero.
    pub fn filled_rows(&self) -> u16 {
        let Self {
            utilization,
            height,
            width: _,
        } = *self;

        let fraction = utilization.fraction();
        let fraction = if !fraction.is_finite() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        let filled = (f64::from(height) * fraction).ceil();
        // `filled` is within `0..=height`, so this cast cannot truncate.
        (filled as u16).min(height)
    }

    /// draws the meter with its top-left corner at the given position.
    pub fn draw(&self, writer: &mut impl Write, (x, y): (u16, u16)) -> io::Result<()> {
        let Self { width, height, .. } = *self;
        let filled = self.filled_rows();
        let empty = height - filled;

        let active = repeat_n(Self::ACTIVE, width.into()).collect::<String>();
        let idle = repeat_n(Self::IDLE, width.into()).collect::<String>();

        for row in 0..height {
            let line = if row < empty { &idle } else { &active };
            writer
                .queue(cursor::MoveTo(x, y + row))?
                .queue(style::Print(line))?;
        }

        Ok(())
    }
}
