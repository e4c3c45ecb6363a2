use super::{DisplaySink, Update};
use crate::{
    error::DisplayError,
    render::{ROWS, Rgb888},
    screen::PriceOverlay,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default Awtrix host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Awtrix port.
pub const DEFAULT_PORT: u16 = 7000;

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const TEXT_POSITION: [usize; 2] = [1, 1];

/// Single Awtrix draw directive.
///
/// ### Raw Payload Examples
/// ```json
/// {"type": "fill", "color": [50, 50, 50]}
/// {"type": "text", "string": "32942.44", "position": [1, 1], "color": [255, 255, 255]}
/// {"type": "bmp", "position": [0, 0], "size": [32, 8], "data": [0, 31, 2016]}
/// {"type": "show"}
/// ```
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Fill {
        color: [u8; 3],
    },
    Text {
        string: String,
        position: [usize; 2],
        color: [u8; 3],
    },
    Line {
        start: [usize; 2],
        end: [usize; 2],
        color: [u8; 3],
    },
    Pixel {
        position: [usize; 2],
        color: [u8; 3],
    },
    Bmp {
        position: [usize; 2],
        size: [usize; 2],
        data: Vec<u16>,
    },
    Show,
    Exit,
}

/// Body of a `POST /api/v3/draw` request.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct DrawRequest {
    pub draw: Vec<Directive>,
}

fn color(rgb: Rgb888) -> [u8; 3] {
    [rgb.r, rgb.g, rgb.b]
}

impl DrawRequest {
    /// Chart bitmap overlaid with the latest price.
    pub fn from_update(update: &Update<'_>) -> Self {
        Self {
            draw: vec![
                Directive::Bmp {
                    position: [0, 0],
                    size: [update.frame.width(), ROWS],
                    data: update.frame.to_rgb565(),
                },
                Directive::Text {
                    string: format!("{:.2}", update.price.price),
                    position: TEXT_POSITION,
                    color: color(Rgb888::WHITE),
                },
                Directive::Show,
            ],
        }
    }

    /// Chart with prices drawn in a pixel font, as a single bitmap.
    pub fn overlay(update: &Update<'_>, overlay: &PriceOverlay) -> Self {
        let screen = overlay.compose(update.frame, update.latest);
        Self {
            draw: vec![
                Directive::Bmp {
                    position: [0, 0],
                    size: [screen.width(), ROWS],
                    data: screen.to_rgb565(),
                },
                Directive::Show,
            ],
        }
    }

    /// Chart drawn cell by cell on a cleared matrix.
    pub fn pixels(update: &Update<'_>) -> Self {
        let mut draw = vec![Directive::Fill {
            color: color(Rgb888::BLACK),
        }];
        draw.extend(update.frame.pixels().into_iter().map(|pixel| Directive::Pixel {
            position: [pixel.x, pixel.y],
            color: color(pixel.colour),
        }));
        draw.push(Directive::Show);
        Self { draw }
    }

    pub fn exit() -> Self {
        Self {
            draw: vec![Directive::Exit],
        }
    }
}

/// How each frame is drawn on the matrix.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub enum AwtrixLayout {
    /// Dense RGB565 bitmap followed by the latest price in the Awtrix font.
    #[default]
    Bitmap,
    /// One pixel directive per lit cell.
    Pixels,
    /// Dense RGB565 bitmap with prices drawn in a pixel font.
    Overlay(PriceOverlay),
}

/// [`DisplaySink`] for an Awtrix pixel matrix.
#[derive(Debug, Clone)]
pub struct AwtrixSink {
    http: Client,
    url: String,
    layout: AwtrixLayout,
}

impl AwtrixSink {
    pub fn new(host: &str, port: u16) -> Result<Self, DisplayError> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: format!("http://{host}:{port}/api/v3/draw"),
            layout: AwtrixLayout::default(),
        })
    }

    pub fn with_layout(mut self, layout: AwtrixLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a draw request. Non-success responses are logged, not returned.
    pub async fn push(&self, request: &DrawRequest) -> Result<(), DisplayError> {
        let response = self.http.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, url = %self.url, "awtrix rejected draw request");
            return Ok(());
        }

        debug!(directives = request.draw.len(), "sent to awtrix");
        Ok(())
    }
}

#[async_trait]
impl DisplaySink for AwtrixSink {
    async fn show(&mut self, update: &Update<'_>) -> Result<(), DisplayError> {
        let request = match &self.layout {
            AwtrixLayout::Bitmap => DrawRequest::from_update(update),
            AwtrixLayout::Pixels => DrawRequest::pixels(update),
            AwtrixLayout::Overlay(overlay) => DrawRequest::overlay(update, overlay),
        };
        self.push(&request).await
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        self.push(&DrawRequest::exit()).await?;
        info!(url = %self.url, "closed awtrix");
        Ok(())
    }
}
