use bytes::{Bytes, BytesMut};
use encoding_rs::CoderResult;
use std::io;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Streams a non-UTF-8 source into UTF-8 chunks.
///
/// Partial multi-byte sequences are carried across chunks by the inner decoder.
/// Unmappable input becomes U+FFFD instead of an error.
pub struct CharsetTranscoder {
    decoder: encoding_rs::Decoder,
    label: &'static str,
    replaced: bool,
    finished: bool,
}

impl CharsetTranscoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            // sniffs and strips a BOM, which may override `encoding`
            decoder: encoding.new_decoder(),
            label: encoding.name(),
            replaced: false,
            finished: false,
        }
    }

    /// Whether any input so far needed a replacement character.
    #[cfg(test)]
    pub fn had_replacements(&self) -> bool {
        self.replaced
    }

    fn transcode(&mut self, src: &[u8], last: bool) -> Bytes {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len().saturating_mul(3).max(4));
        let mut out = String::with_capacity(capacity);
        let mut consumed = 0usize;

        loop {
            let (result, read, replaced) =
                self.decoder
                    .decode_to_string(&src[consumed..], &mut out, last);
            consumed += read;
            if replaced && !self.replaced {
                debug!("{} input contained unmappable bytes", self.label);
                self.replaced = true;
            }
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => out.reserve(capacity.max(16)),
            }
        }

        Bytes::from(out)
    }
}

impl Decoder for CharsetTranscoder {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() || self.finished {
            return Ok(None);
        }

        let input = src.split_to(src.len());
        let chunk = self.transcode(&input, false);
        Ok((!chunk.is_empty()).then_some(chunk))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.finished {
            buf.clear();
            return Ok(None);
        }

        let input = buf.split_to(buf.len());
        self.finished = true;
        let chunk = self.transcode(&input, true);
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}
