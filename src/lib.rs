//! OPML outline documents and the schema-driven XML mapper behind them.
//!
//! ```no_run
//! # async fn demo() -> Result<(), opmlkit::OpmlError> {
//! use opmlkit::{Config, OpmlFactory};
//!
//! let factory = OpmlFactory::xml(&Config::default())?;
//! let document = factory.read("feeds.opml").await?;
//! for (id, outline) in document.iter() {
//!     let depth = document.depth(id).unwrap_or(1);
//!     println!("{}{}", "  ".repeat(depth - 1), outline.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod factory;
pub mod mapper;
pub mod model;

pub use config::{Config, ConfigError};
pub use factory::{
    DocumentReader, DocumentWriter, OpmlError, OpmlFactory, ResourceError, ResourceOpener,
    XmlDocumentReader, XmlDocumentWriter,
};
pub use mapper::MapperError;
pub use model::{Document, Head, Outline, OutlineId, OutlineTree, TreeError};
