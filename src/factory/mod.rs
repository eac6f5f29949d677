//! Reading and writing OPML documents.
//!
//! [`OpmlFactory`] binds a [`DocumentReader`] and a [`DocumentWriter`]
//! strategy to a [`ResourceOpener`]. The strategies work on bytes; the
//! opener moves bytes between sources, destinations and memory.

pub mod resource;

use std::string::FromUtf8Error;
use thiserror::Error;

use crate::config::Config;
use crate::mapper::{self, MapperError, WriteOptions, DEFAULT_MAX_DEPTH};
use crate::model::Document;
pub use resource::{Resource, ResourceError, ResourceOpener};

#[derive(Debug, Error)]
pub enum OpmlError {
    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Serialized document is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Turns document bytes into a [`Document`].
pub trait DocumentReader: Send + Sync {
    fn read(&self, input: &[u8]) -> Result<Document, MapperError>;
}

/// Turns a [`Document`] into bytes.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, document: &Document) -> Result<Vec<u8>, MapperError>;
}

/// Canonical OPML reader: schema-driven XML mapping.
#[derive(Debug, Clone, Copy)]
pub struct XmlDocumentReader {
    pub max_depth: usize,
}

impl Default for XmlDocumentReader {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DocumentReader for XmlDocumentReader {
    fn read(&self, input: &[u8]) -> Result<Document, MapperError> {
        let mut document = Document::new();
        mapper::parse_with_depth(&mut document, input, self.max_depth)?;
        Ok(document)
    }
}

/// Canonical OPML writer: indented UTF-8 XML.
#[derive(Debug, Clone, Default)]
pub struct XmlDocumentWriter {
    pub options: WriteOptions,
}

impl DocumentWriter for XmlDocumentWriter {
    fn write(&self, document: &Document) -> Result<Vec<u8>, MapperError> {
        mapper::serialize(document, &self.options)
    }
}

pub struct OpmlFactory {
    reader: Box<dyn DocumentReader>,
    writer: Box<dyn DocumentWriter>,
    opener: ResourceOpener,
    touch_modified: bool,
}

impl std::fmt::Debug for OpmlFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpmlFactory")
            .field("opener", &self.opener)
            .field("touch_modified", &self.touch_modified)
            .finish_non_exhaustive()
    }
}

impl OpmlFactory {
    pub fn new(
        reader: Box<dyn DocumentReader>,
        writer: Box<dyn DocumentWriter>,
        opener: ResourceOpener,
    ) -> Self {
        Self {
            reader,
            writer,
            opener,
            touch_modified: true,
        }
    }

    /// The XML reader and writer, configured from `config`.
    pub fn xml(config: &Config) -> Result<Self, OpmlError> {
        let reader = XmlDocumentReader {
            max_depth: config.max_depth,
        };
        let writer = XmlDocumentWriter {
            options: config.write_options(),
        };
        let opener = ResourceOpener::from_config(config)?;
        let mut factory = Self::new(Box::new(reader), Box::new(writer), opener);
        factory.touch_modified = config.touch_modified;
        Ok(factory)
    }

    pub fn reader(&self) -> &dyn DocumentReader {
        self.reader.as_ref()
    }

    pub fn writer(&self) -> &dyn DocumentWriter {
        self.writer.as_ref()
    }

    pub fn opener(&self) -> &ResourceOpener {
        &self.opener
    }

    pub fn set_reader(&mut self, reader: Box<dyn DocumentReader>) {
        self.reader = reader;
    }

    pub fn set_writer(&mut self, writer: Box<dyn DocumentWriter>) {
        self.writer = writer;
    }

    pub fn set_touch_modified(&mut self, enabled: bool) {
        self.touch_modified = enabled;
    }

    /// An empty document carrying this factory's modified-timestamp policy.
    pub fn new_document(&self) -> Document {
        let mut document = Document::new();
        document.set_touch_modified(self.touch_modified);
        document
    }

    /// Loads a document from a path, `file://` URL or `http(s)://` URL.
    pub async fn read(&self, source: &str) -> Result<Document, OpmlError> {
        let bytes = self.opener.open(source).await?;
        let document = self.parse_bytes(&bytes)?;
        tracing::info!(
            source = %source,
            outlines = document.len(),
            "Read OPML document"
        );
        Ok(document)
    }

    /// Stores a document at a path or `file://` URL.
    pub async fn write(&self, destination: &str, document: &Document) -> Result<(), OpmlError> {
        let bytes = self.writer.write(document)?;
        self.opener.store(destination, &bytes).await?;
        tracing::info!(
            destination = %destination,
            outlines = document.len(),
            bytes = bytes.len(),
            "Wrote OPML document"
        );
        Ok(())
    }

    /// Parses in-memory bytes, applying the configured size limit.
    pub fn parse_bytes(&self, input: &[u8]) -> Result<Document, OpmlError> {
        let limit = self.opener.max_bytes();
        if input.len() > limit {
            return Err(ResourceError::TooLarge { limit }.into());
        }
        let mut document = self.reader.read(input)?;
        document.set_touch_modified(self.touch_modified);
        Ok(document)
    }

    pub fn parse_str(&self, input: &str) -> Result<Document, OpmlError> {
        self.parse_bytes(input.as_bytes())
    }

    pub fn to_xml_string(&self, document: &Document) -> Result<String, OpmlError> {
        Ok(String::from_utf8(self.writer.write(document)?)?)
    }

    /// Serializes into any byte sink.
    pub fn write_to<W: std::io::Write>(
        &self,
        document: &Document,
        mut sink: W,
    ) -> Result<(), OpmlError> {
        let bytes = self.writer.write(document)?;
        sink.write_all(&bytes).map_err(MapperError::from)?;
        Ok(())
    }
}
