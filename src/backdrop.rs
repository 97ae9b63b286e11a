use base64::{Engine as _, engine::general_purpose::STANDARD};
use plotters::{
    coord::Shift,
    prelude::{DrawingArea, DrawingBackend, RGBColor},
};
use std::io::{self, Read};
use tracing::{info, warn};

/// Flat colour used when no background image could be loaded.
pub const FALLBACK: RGBColor = RGBColor(0xF5, 0xD6, 0xBA);

const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Decorative background for the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backdrop {
    Image { mime: &'static str, bytes: Vec<u8> },
    Unavailable,
}

impl Backdrop {
    /// Download the background image at `url`. Never fails: anything other
    /// than a 200 carrying a recognisable image is `Unavailable`.
    pub fn fetch(url: &str) -> Self {
        let response = match ureq::get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                warn!(url, status, "failed to load background image");
                return Backdrop::Unavailable;
            }
            Err(err) => {
                warn!(url, error = %err, "failed to load background image");
                return Backdrop::Unavailable;
            }
        };

        if response.status() != 200 {
            warn!(url, status = response.status(), "failed to load background image");
            return Backdrop::Unavailable;
        }

        let bytes = match read_capped(response.into_reader(), MAX_IMAGE_BYTES) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(url, limit = MAX_IMAGE_BYTES, "background image is too large");
                return Backdrop::Unavailable;
            }
            Err(err) => {
                warn!(url, error = %err, "failed to read background image");
                return Backdrop::Unavailable;
            }
        };

        let backdrop = Backdrop::from_bytes(bytes);
        match &backdrop {
            Backdrop::Image { mime, bytes } => {
                info!(url, mime, size = bytes.len(), "background image set")
            }
            Backdrop::Unavailable => warn!(url, "background is not an image"),
        }
        backdrop
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match sniff(&bytes) {
            Some(mime) => Backdrop::Image { mime, bytes },
            None => Backdrop::Unavailable,
        }
    }

    /// Lay down the background of a freshly created drawing area.
    pub fn paint<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<(), plotters::drawing::DrawingAreaErrorKind<DB::ErrorType>> {
        match self {
            Backdrop::Image { .. } => Ok(()),
            Backdrop::Unavailable => area.fill(&FALLBACK),
        }
    }

    /// Put the image underneath everything else in a rendered SVG document.
    pub fn embed(&self, svg: &str, (width, height): (u32, u32)) -> String {
        let Backdrop::Image { mime, bytes } = self else {
            return svg.to_owned();
        };

        let Some(open) = svg.find("<svg") else {
            return svg.to_owned();
        };
        let Some(end) = svg[open..].find('>').map(|idx| open + idx + 1) else {
            return svg.to_owned();
        };

        let image = format!(
            concat!(
                "\n<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" ",
                "preserveAspectRatio=\"xMidYMid slice\" href=\"data:{mime};base64,{data}\"/>",
            ),
            width = width,
            height = height,
            mime = mime,
            data = STANDARD.encode(bytes),
        );

        let mut out = String::with_capacity(svg.len() + image.len());
        out.push_str(&svg[..end]);
        out.push_str(&image);
        out.push_str(&svg[end..]);
        out
    }
}

/// Read at most `limit` bytes; `None` when the body is longer than that.
fn read_capped(reader: impl Read, limit: u64) -> io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes)?;

    Ok((bytes.len() as u64 <= limit).then_some(bytes))
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
