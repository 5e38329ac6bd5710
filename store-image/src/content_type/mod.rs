//! Content sniffing from leading bytes

use image::ImageFormat;
use mime::Mime;

/// Number of leading bytes inspected
const SNIFF_LEN: usize = 512;

/// A magic-number signature for formats `image` does not detect; `None` bytes
/// match anything
struct Signature {
    offset: usize,
    pattern: &'static [Option<u8>],
    mime: &'static str,
}

macro_rules! sig {
    (@byte _) => { None };
    (@byte $byte:expr) => { Some($byte) };
    ($offset:expr, [$($byte:tt),+ $(,)?], $mime:expr) => {
        Signature {
            offset: $offset,
            pattern: &[$(sig!(@byte $byte)),+],
            mime: $mime,
        }
    };
}

const SIGNATURES: &[Signature] = &[
    sig!(0, [0x00, 0x00, 0x02, 0x00], "image/x-icon"),
    sig!(4, [b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f'], "image/avif"),
    sig!(4, [b'f', b't', b'y', b'p', b'a', b'v', b'i', b's'], "image/avif"),
    sig!(4, [b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c'], "image/heic"),
    sig!(4, [b'f', b't', b'y', b'p', b'h', b'e', b'i', b'x'], "image/heic"),
    sig!(0, [b'%', b'P', b'D', b'F', b'-'], "application/pdf"),
    sig!(0, [b'P', b'K', 0x03, 0x04], "application/zip"),
    sig!(0, [0x1F, 0x8B, 0x08], "application/x-gzip"),
    sig!(0, [0x00, b'a', b's', b'm'], "application/wasm"),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        let Some(window) = data.get(self.offset..self.offset + self.pattern.len()) else {
            return false;
        };

        window
            .iter()
            .zip(self.pattern)
            .all(|(byte, expected)| expected.is_none_or(|e| e == *byte))
    }
}

/// Derives the media type and file extension of `data` from its magic number
///
/// Raster formats are recognised by `image`, everything else by the local
/// signature table. Never fails: empty or unrecognised input is
/// `application/octet-stream` with extension `octet-stream`. The extension is
/// the MIME subtype.
#[must_use]
pub fn classify(data: &[u8]) -> (Mime, String) {
    let head = &data[..data.len().min(SNIFF_LEN)];

    let mime = image_mime(head)
        .or_else(|| {
            SIGNATURES
                .iter()
                .find(|signature| signature.matches(head))
                .and_then(|signature| signature.mime.parse::<Mime>().ok())
        })
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    let extension = mime.subtype().as_str().to_string();
    (mime, extension)
}

fn image_mime(head: &[u8]) -> Option<Mime> {
    image::guess_format(head)
        .ok()
        .map(|format: ImageFormat| format.to_mime_type())
        .and_then(|name| name.parse::<Mime>().ok())
        .filter(|mime| *mime != mime::APPLICATION_OCTET_STREAM)
}
