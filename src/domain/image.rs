use base64::{engine::general_purpose::STANDARD, Engine};

/// How an image field is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImagePayload<'a> {
    Empty,
    /// Body of a `data:<mime>;base64,<body>` URI.
    Inline(&'a str),
    Remote(&'a str),
}

impl<'a> ImagePayload<'a> {
    pub fn classify(value: &'a str) -> Self {
        if value.is_empty() {
            return ImagePayload::Empty;
        }
        if let Some(rest) = value.strip_prefix("data:") {
            if let Some((_header, body)) = rest.split_once(',') {
                return ImagePayload::Inline(body);
            }
        }
        ImagePayload::Remote(value)
    }

    /// Decoded size of an inline payload. Remote and empty payloads weigh nothing
    /// locally; an undecodable body is counted by its encoded length.
    pub fn inline_bytes(&self) -> usize {
        match self {
            ImagePayload::Inline(body) => STANDARD
                .decode(body)
                .map(|bytes| bytes.len())
                .unwrap_or(body.len()),
            ImagePayload::Empty | ImagePayload::Remote(_) => 0,
        }
    }
}
