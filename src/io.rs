use crate::IngestResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

use crate::codec::CharsetTranscoder;

/// Which parsing path an upload takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    Csv,
    LabelBlocks,
}

impl SourceFormat {
    /// `.csv` names (optionally compressed) take the CSV path. Without a name,
    /// a `text/csv` content type does too. Everything else, `text/plain`
    /// included, is read as label blocks.
    pub fn detect(meta: &SourceMeta) -> Self {
        let name = meta.name_hint.to_ascii_lowercase();
        if !name.is_empty() {
            let stem = name
                .strip_suffix(".gz")
                .or_else(|| name.strip_suffix(".zst"))
                .unwrap_or(&name);
            return if stem.ends_with(".csv") {
                SourceFormat::Csv
            } else {
                SourceFormat::LabelBlocks
            };
        }

        let ct = meta.content_type.to_ascii_lowercase();
        let mime = ct.split(';').next().unwrap_or_default().trim();
        if mime == "text/csv" {
            SourceFormat::Csv
        } else {
            SourceFormat::LabelBlocks
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// e.g. "text/csv", "text/plain" or "application/gzip"
    pub content_type: String,
    /// e.g. "gzip", "zstd", or empty
    pub content_encoding: String,
    /// original file name, used for format routing and extension fallback
    pub name_hint: String,
    /// Which character encoding to expect (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl SourceMeta {
    /// Meta for an in-memory upload with a known file name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name_hint: name.into(),
            ..Default::default()
        }
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::detect(self)
    }
}

/// Wrap a raw reader with optional decompression and transcoding to UTF-8.
pub fn build_source_reader<R>(raw: R, meta: &SourceMeta) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    // decompression choice: encoding -> type -> extension
    let ce = meta.content_encoding.to_ascii_lowercase();
    let ct = meta.content_type.to_ascii_lowercase();
    let name = meta.name_hint.to_ascii_lowercase();

    let is_gzip = ce.split(',').any(|s| s.trim() == "gzip")
        || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
        || name.ends_with(".gz");

    let is_zstd = ce.split(',').any(|s| s.trim() == "zstd")
        || ct == "application/zstd"
        || name.ends_with(".zst");

    // defect logs are small; 64 KiB is plenty
    let buf = BufReader::with_capacity(1 << 16, raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = if is_gzip {
        Box::new(GzipDecoder::new(buf))
    } else if is_zstd {
        Box::new(ZstdDecoder::new(buf))
    } else {
        Box::new(buf)
    };

    if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, CharsetTranscoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    }
}

/// Read a whole source into text.
///
/// Invalid UTF-8 is replaced rather than rejected and a leading BOM is dropped.
pub async fn read_source_text<R>(raw: R, meta: &SourceMeta) -> IngestResult<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = build_source_reader(raw, meta);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("{} is not valid UTF-8, replacing bad bytes", meta.name_hint);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Open a local file and derive its meta from the file name.
pub async fn reader_from_path(path: &Path) -> IngestResult<(File, SourceMeta)> {
    let file = File::open(path).await?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mut meta = SourceMeta::named(name);

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "gz" => {
            meta.content_type = "application/gzip".into();
            meta.content_encoding = "gzip".into();
        }
        "zst" => {
            meta.content_type = "application/zstd".into();
            meta.content_encoding = "zstd".into();
        }
        "csv" => meta.content_type = "text/csv".into(),
        _ => meta.content_type = "text/plain".into(),
    }

    Ok((file, meta))
}
