use super::{DisplaySink, Update};
use crate::{
    error::DisplayError,
    render::ROWS,
    screen::{PriceOverlay, Screen},
};
use async_trait::async_trait;
use crossterm::{
    cursor::MoveToPreviousLine,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{Stdout, Write, stdout};

const CELL: &str = "██";
const BLANK: &str = "  ";

/// [`DisplaySink`] printing the chart as coloured blocks, redrawn in place.
#[derive(Debug)]
pub struct TerminalSink<W = Stdout> {
    writer: W,
    overlay: Option<PriceOverlay>,
    drawn: bool,
}

impl TerminalSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W> TerminalSink<W>
where
    W: Write + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            overlay: None,
            drawn: false,
        }
    }

    /// Draw prices in a pixel font over the chart.
    pub fn with_overlay(mut self, overlay: PriceOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn draw(&mut self, update: &Update<'_>) -> std::io::Result<()> {
        let screen = match &self.overlay {
            Some(overlay) => overlay.compose(update.frame, update.latest),
            None => Screen::from_frame(update.frame),
        };

        if self.drawn {
            queue!(self.writer, MoveToPreviousLine(ROWS as u16 + 1))?;
        }

        for y in 0..ROWS {
            for x in 0..screen.width() {
                match screen.cell(x, y) {
                    Some(rgb) => queue!(
                        self.writer,
                        SetForegroundColor(Color::Rgb {
                            r: rgb.r,
                            g: rgb.g,
                            b: rgb.b,
                        }),
                        Print(CELL),
                        ResetColor
                    )?,
                    None => queue!(self.writer, Print(BLANK))?,
                }
            }
            queue!(self.writer, Clear(ClearType::UntilNewLine), Print("\r\n"))?;
        }

        queue!(
            self.writer,
            Print(format!("{} {}", update.price.symbol, update.price.price)),
            Clear(ClearType::UntilNewLine),
            Print("\r\n")
        )?;

        self.writer.flush()?;
        self.drawn = true;
        Ok(())
    }
}

#[async_trait]
impl<W> DisplaySink for TerminalSink<W>
where
    W: Write + Send,
{
    async fn show(&mut self, update: &Update<'_>) -> Result<(), DisplayError> {
        self.draw(update).map_err(DisplayError::from)
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        queue!(self.writer, ResetColor)?;
        self.writer.flush().map_err(DisplayError::from)
    }
}
