//! Pure rendering of a price window into display pixels.
//!
//! Prices are quantized into levels `0..=6`, plotted as one lit cell per column on an
//! 8-row bitmap (row 0 at the top, never lit by a price), coloured by each column's trend
//! relative to its predecessor, and packed into RGB565 for the device.

use itertools::{Itertools, MinMaxResult};
use std::fmt;

/// Number of bitmap rows.
pub const ROWS: usize = 8;

/// Highest quantization level.
pub const MAX_LEVEL: u8 = 6;

/// Level assigned to every column of a flat price series.
pub const FLAT_LEVEL: u8 = 3;

/// 24-bit colour.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Rgb888 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb888 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into 16-bit RGB565 by dropping the low bits of each channel.
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }
}

/// Direction of a column's price relative to the previous column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Trend {
    Down,
    Flat,
    Up,
}

impl Trend {
    pub fn colour(self) -> Rgb888 {
        match self {
            Trend::Up => Rgb888::GREEN,
            Trend::Down => Rgb888::RED,
            Trend::Flat => Rgb888::BLUE,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Trend::Up => '↑',
            Trend::Down => '↓',
            Trend::Flat => '-',
        }
    }
}

/// Quantize prices into levels `0..=6` relative to the series range.
///
/// A flat series maps every price to [`FLAT_LEVEL`].
pub fn quantize(prices: &[f64]) -> Vec<u8> {
    let (min, max) = match prices.iter().copied().minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => return Vec::new(),
        MinMaxResult::OneElement(price) => (price, price),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    let range = max - min;
    if range == 0.0 {
        return vec![FLAT_LEVEL; prices.len()];
    }

    prices
        .iter()
        .map(|price| {
            let level = ((price - min) / range * MAX_LEVEL as f64).round();
            level.clamp(0.0, MAX_LEVEL as f64) as u8
        })
        .collect()
}

/// Trend of each price against its predecessor. The first column is always [`Trend::Flat`].
pub fn trends(prices: &[f64]) -> Vec<Trend> {
    let mut trends = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return trends;
    }

    trends.push(Trend::Flat);
    trends.extend(prices.iter().tuple_windows().map(|(prev, next)| {
        if next > prev {
            Trend::Up
        } else if next < prev {
            Trend::Down
        } else {
            Trend::Flat
        }
    }));
    trends
}

/// [`ROWS`] x width grid with at most one lit cell per column.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Bitmap {
    rows: Vec<Vec<bool>>,
}

impl Bitmap {
    /// Plot each level at row `7 - level` of its column.
    pub fn from_levels(levels: &[u8]) -> Self {
        let mut rows = vec![vec![false; levels.len()]; ROWS];
        for (x, level) in levels.iter().enumerate() {
            rows[ROWS - 1 - usize::from((*level).min(MAX_LEVEL))][x] = true;
        }
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }
}

/// Single lit display cell.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    pub colour: Rgb888,
}

/// Everything a display needs to draw one window snapshot.
#[derive(Clone, PartialEq, Debug)]
pub struct Frame {
    pub levels: Vec<u8>,
    pub bitmap: Bitmap,
    pub trends: Vec<Trend>,
}

impl Frame {
    pub fn render(prices: &[f64]) -> Self {
        let levels = quantize(prices);
        Self {
            bitmap: Bitmap::from_levels(&levels),
            trends: trends(prices),
            levels,
        }
    }

    pub fn width(&self) -> usize {
        self.levels.len()
    }

    /// Colour of the cell at `(x, y)`, if lit.
    pub fn colour(&self, x: usize, y: usize) -> Option<Rgb888> {
        self.bitmap
            .is_set(x, y)
            .then(|| self.trends[x].colour())
    }

    /// Sparse lit cells, one per column, in column order.
    pub fn pixels(&self) -> Vec<Pixel> {
        self.levels
            .iter()
            .zip(&self.trends)
            .enumerate()
            .map(|(x, (level, trend))| Pixel {
                x,
                y: ROWS - 1 - usize::from(*level),
                colour: trend.colour(),
            })
            .collect()
    }

    /// Dense row-major RGB565 buffer of `ROWS * width` cells, unlit cells black.
    pub fn to_rgb565(&self) -> Vec<u16> {
        (0..ROWS)
            .flat_map(|y| (0..self.width()).map(move |x| (x, y)))
            .map(|(x, y)| self.colour(x, y).unwrap_or(Rgb888::BLACK).to_rgb565())
            .collect()
    }

    /// RGB565 colour of each column.
    pub fn column_rgb565(&self) -> Vec<u16> {
        self.trends
            .iter()
            .map(|trend| trend.colour().to_rgb565())
            .collect()
    }

    /// One trend symbol per column, eg/ `-↑↑↓-`.
    pub fn trend_line(&self) -> String {
        self.trends.iter().map(|trend| trend.symbol()).collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self
            .bitmap
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|lit| if *lit { "██" } else { "  " })
                    .collect::<String>()
            })
            .join("\n");
        write!(f, "{grid}")
    }
}
