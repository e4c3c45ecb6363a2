//! Pixel-font prices drawn over a rendered [`Frame`].
//!
//! The primary market's price is drawn in [`Font::Medium`] on the top rows and an optional
//! secondary market's price in [`Font::Small`] on the bottom rows, both right-aligned.
//! Unlit glyph cells leave the chart underneath visible.

use crate::{
    config::MarketConfig,
    render::{Frame, ROWS, Rgb888},
    sink::LatestPrices,
};
use smol_str::SmolStr;

/// Colour of the primary market's price.
pub const PRIMARY_COLOUR: Rgb888 = Rgb888::new(255, 255, 0);

/// Colour of the secondary market's price.
pub const SECONDARY_COLOUR: Rgb888 = Rgb888::new(200, 200, 200);

/// Most decimals drawn for a price.
pub const MAX_DECIMALS: usize = 2;

const SECONDARY_ROW: usize = ROWS - 3;

type Glyph = &'static [&'static str];

const MEDIUM_DIGITS: [Glyph; 10] = [
    &["###", "#.#", "#.#", "#.#", "###"],
    &[".#.", "##.", ".#.", ".#.", "###"],
    &["###", "..#", "###", "#..", "###"],
    &["###", "..#", "###", "..#", "###"],
    &["#.#", "#.#", "###", "..#", "..#"],
    &["###", "#..", "###", "..#", "###"],
    &["###", "#..", "###", "#.#", "###"],
    &["###", "..#", "..#", "..#", "..#"],
    &["###", "#.#", "###", "#.#", "###"],
    &["###", "#.#", "###", "..#", "###"],
];
const MEDIUM_DOT: Glyph = &[".", ".", ".", ".", "#"];
const MEDIUM_UNKNOWN: Glyph = &["###", "###", "###", "###", "###"];

const SMALL_DIGITS: [Glyph; 10] = [
    &["###", "#.#", "###"],
    &["##.", ".#.", "###"],
    &["##.", ".#.", ".##"],
    &["###", ".##", "###"],
    &["#.#", "###", "..#"],
    &[".##", ".#.", "##."],
    &["#..", "###", "###"],
    &["###", "..#", "..#"],
    &[".##", "###", "##."],
    &["###", "###", "..#"],
];
const SMALL_DOT: Glyph = &[".", ".", "#"];
const SMALL_UNKNOWN: Glyph = &["###", "###", "###"];

/// Pixel font for digits and the decimal point. Other characters draw as a solid block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Font {
    /// 3x5 glyphs.
    Medium,
    /// 3x3 glyphs.
    Small,
}

impl Font {
    pub fn height(self) -> usize {
        match self {
            Font::Medium => 5,
            Font::Small => 3,
        }
    }

    fn glyph(self, c: char) -> Glyph {
        let (digits, dot, unknown) = match self {
            Font::Medium => (&MEDIUM_DIGITS, MEDIUM_DOT, MEDIUM_UNKNOWN),
            Font::Small => (&SMALL_DIGITS, SMALL_DOT, SMALL_UNKNOWN),
        };

        match c {
            '.' => dot,
            _ => c
                .to_digit(10)
                .map_or(unknown, |digit| digits[digit as usize]),
        }
    }
}

/// Monochrome text in a pixel [`Font`], glyphs separated by one blank column.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Glyphs {
    rows: Vec<Vec<bool>>,
}

impl Glyphs {
    pub fn text(text: &str, font: Font) -> Self {
        let mut rows = vec![Vec::new(); font.height()];

        for (index, c) in text.chars().enumerate() {
            for (row, pattern) in rows.iter_mut().zip(font.glyph(c)) {
                if index > 0 {
                    row.push(false);
                }
                row.extend(pattern.chars().map(|cell| cell == '#'));
            }
        }

        Self { rows }
    }

    /// `price` with the most decimals, up to [`MAX_DECIMALS`], that fit in `max_width`.
    /// Falls back to the integer part, which may still be clipped when drawn.
    pub fn price(price: f64, font: Font, max_width: usize) -> Self {
        (1..=MAX_DECIMALS)
            .rev()
            .map(|decimals| Self::text(&format!("{price:.decimals$}"), font))
            .find(|glyphs| glyphs.width() <= max_width)
            .unwrap_or_else(|| Self::text(&format!("{price:.0}"), font))
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }
}

/// [`ROWS`] x width grid of display cells, `None` when unlit.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Screen {
    cells: Vec<Vec<Option<Rgb888>>>,
}

impl Screen {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            cells: (0..ROWS)
                .map(|y| (0..frame.width()).map(|x| frame.colour(x, y)).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Rgb888> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    /// Paint the lit cells of `glyphs` with their top-left corner at `(x, y)`, clipping at
    /// the screen edges.
    pub fn draw(&mut self, glyphs: &Glyphs, x: usize, y: usize, colour: Rgb888) {
        for (dy, row) in glyphs.rows.iter().enumerate() {
            let Some(cells) = self.cells.get_mut(y + dy) else {
                break;
            };

            for (dx, lit) in row.iter().enumerate() {
                if let (true, Some(cell)) = (*lit, cells.get_mut(x + dx)) {
                    *cell = Some(colour);
                }
            }
        }
    }

    /// Draw `glyphs` right-aligned, leaving one blank column at the right edge.
    pub fn draw_right(&mut self, glyphs: &Glyphs, y: usize, colour: Rgb888) {
        let x = self.width().saturating_sub(glyphs.width() + 1);
        self.draw(glyphs, x, y, colour);
    }

    /// Dense row-major RGB565 buffer, unlit cells black.
    pub fn to_rgb565(&self) -> Vec<u16> {
        self.cells
            .iter()
            .flatten()
            .map(|cell| cell.unwrap_or(Rgb888::BLACK).to_rgb565())
            .collect()
    }
}

/// Markets whose latest prices are drawn over the chart.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PriceOverlay {
    primary: SmolStr,
    secondary: Option<SmolStr>,
}

impl PriceOverlay {
    pub fn new(primary: impl Into<SmolStr>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<SmolStr>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    /// Overlay of the first configured market, plus the second if there is one.
    pub fn from_markets(markets: &[MarketConfig]) -> Option<Self> {
        let mut symbols = markets.iter().map(|config| config.market.symbol.clone());
        let overlay = Self::new(symbols.next()?);

        Some(match symbols.next() {
            Some(secondary) => overlay.with_secondary(secondary),
            None => overlay,
        })
    }

    /// Draw the latest known prices over `frame`. Markets without a price are skipped.
    pub fn compose(&self, frame: &Frame, latest: &LatestPrices) -> Screen {
        let mut screen = Screen::from_frame(frame);
        let max_width = screen.width().saturating_sub(1);

        if let Some(price) = latest.get(&self.primary) {
            screen.draw_right(
                &Glyphs::price(*price, Font::Medium, max_width),
                0,
                PRIMARY_COLOUR,
            );
        }

        if let Some(price) = self.secondary.as_ref().and_then(|symbol| latest.get(symbol)) {
            screen.draw_right(
                &Glyphs::price(*price, Font::Small, max_width),
                SECONDARY_ROW,
                SECONDARY_COLOUR,
            );
        }

        screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_markets;
    use std::collections::HashMap;

    fn pattern(glyphs: &Glyphs) -> Vec<String> {
        (0..glyphs.height())
            .map(|y| {
                (0..glyphs.width())
                    .map(|x| if glyphs.is_set(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_glyphs_text() {
        struct TestCase {
            input: (&'static str, Font),
            expected: Vec<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: medium zero
                input: ("0", Font::Medium),
                expected: vec!["###", "#.#", "#.#", "#.#", "###"],
            },
            TestCase {
                // TC1: medium one
                input: ("1", Font::Medium),
                expected: vec![".#.", "##.", ".#.", ".#.", "###"],
            },
            TestCase {
                // TC2: decimal point is one column wide, after a blank separator
                input: ("4.", Font::Medium),
                expected: vec!["#.#..", "#.#..", "###..", "..#..", "..#.#"],
            },
            TestCase {
                // TC3: small glyphs
                input: ("27", Font::Small),
                expected: vec!["##..###", ".#....#", ".##...#"],
            },
            TestCase {
                // TC4: unsupported character is a solid block
                input: ("x", Font::Small),
                expected: vec!["###", "###", "###"],
            },
            TestCase {
                // TC5: empty text keeps the font height
                input: ("", Font::Medium),
                expected: vec!["", "", "", "", ""],
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = pattern(&Glyphs::text(test.input.0, test.input.1));
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_glyphs_price_fits_width() {
        struct TestCase {
            input: (f64, Font, usize),
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: two decimals fit the 32 column matrix
                input: (32942.44, Font::Medium, 31),
                expected: "32942.44",
            },
            TestCase {
                // TC1: one decimal dropped to fit
                input: (32942.44, Font::Medium, 25),
                expected: "32942.4",
            },
            TestCase {
                // TC2: nothing fits, integer part
                input: (32942.44, Font::Medium, 10),
                expected: "32942",
            },
            TestCase {
                // TC3: small font pads decimals
                input: (2001.5, Font::Small, 31),
                expected: "2001.50",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let (price, font, max_width) = test.input;
            let actual = Glyphs::price(price, font, max_width);
            assert_eq!(actual, Glyphs::text(test.expected, font), "TC{} failed", index);
            assert_eq!(actual.width(), Glyphs::text(test.expected, font).width());
        }

        assert_eq!(Glyphs::text("32942.44", Font::Medium).width(), 29);
    }

    #[test]
    fn test_screen_draw_clips_at_edges() {
        let mut screen = Screen::from_frame(&Frame::render(&[1.0; 4]));

        screen.draw(&Glyphs::text("8", Font::Medium), 2, 6, PRIMARY_COLOUR);

        assert_eq!(screen.cell(2, 6), Some(PRIMARY_COLOUR));
        assert_eq!(screen.cell(3, 6), Some(PRIMARY_COLOUR));
        assert_eq!(screen.cell(2, 7), Some(PRIMARY_COLOUR));
        assert_eq!(screen.cell(3, 7), None);
        assert_eq!(screen.cell(0, 4), Some(Rgb888::BLUE));
        assert_eq!(screen.to_rgb565().len(), ROWS * 4);
    }

    #[test]
    fn test_overlay_compose() {
        let prices = (1..=32).map(|price| price as f64).collect::<Vec<_>>();
        let frame = Frame::render(&prices);
        let overlay = PriceOverlay::from_markets(&parse_markets("btcusdt,ethusdt").unwrap()).unwrap();
        assert_eq!(overlay, PriceOverlay::new("btcusdt").with_secondary("ethusdt"));

        let latest = HashMap::from([
            (SmolStr::new("btcusdt"), 32942.44),
            (SmolStr::new("ethusdt"), 2001.5),
        ]);
        let screen = overlay.compose(&frame, &latest);

        // Primary "32942.44" is 29 columns wide, drawn from column 2
        assert_eq!(screen.cell(1, 0), None);
        assert_eq!(screen.cell(2, 0), Some(PRIMARY_COLOUR));
        assert_eq!(screen.cell(30, 4), Some(PRIMARY_COLOUR));
        assert_eq!(screen.cell(31, 4), None);

        // Secondary "2001.50" is 25 columns wide, drawn from column 6 on row 5
        assert_eq!(screen.cell(6, 5), Some(SECONDARY_COLOUR));
        assert_eq!(screen.cell(7, 5), Some(SECONDARY_COLOUR));

        // Unlit glyph cells keep the chart underneath
        assert_eq!(screen.cell(8, 5), Some(Rgb888::GREEN));

        let rgb565 = screen.to_rgb565();
        assert_eq!(rgb565.len(), ROWS * 32);
        assert_eq!(rgb565[2], PRIMARY_COLOUR.to_rgb565());
    }

    #[test]
    fn test_overlay_without_prices_is_the_chart() {
        let frame = Frame::render(&[1.0, 2.0, 3.0]);
        let overlay = PriceOverlay::new("btcusdt").with_secondary("ethusdt");

        assert_eq!(
            overlay.compose(&frame, &LatestPrices::new()),
            Screen::from_frame(&frame)
        );
        assert_eq!(PriceOverlay::from_markets(&[]), None);
    }
}
