use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use opmlkit::{Config, Document, OpmlFactory};

#[derive(Parser, Debug)]
#[command(name = "opmlkit", about = "Inspect and rewrite OPML outline documents")]
struct Args {
    /// Config file (default: ~/.config/opmlkit/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the outline tree of a document
    Tree {
        /// File path, file:// URL or http(s):// URL
        source: String,
    },

    /// List the feed subscriptions of a document
    Feeds {
        source: String,
    },

    /// Read a document and write it back out in canonical form
    Convert {
        source: String,

        /// File path or file:// URL
        destination: String,

        /// Replace the head title
        #[arg(long)]
        title: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = match path {
        Some(p) => p.clone(),
        None => match Config::default_path() {
            Some(p) => p,
            None => {
                tracing::debug!("HOME not set, using default configuration");
                return Ok(Config::default());
            }
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config '{}'", path.display()))
}

fn print_tree(document: &Document) {
    if let Some(title) = &document.head().title {
        println!("{}", title);
    }
    for (id, outline) in document.iter() {
        let depth = document.depth(id).unwrap_or(1);
        let indent = "  ".repeat(depth - 1);
        match &outline.xml_url {
            Some(xml_url) => println!("{}- {} <{}>", indent, outline.label(), xml_url),
            None => println!("{}- {}", indent, outline.label()),
        }
    }
}

fn print_feeds(document: &Document) {
    let mut count = 0usize;
    for (id, outline) in document.iter().filter(|(_, o)| o.is_feed()) {
        let folder = document
            .parent(id)
            .and_then(|p| document.outline(p))
            .map(|p| p.label().to_string())
            .unwrap_or_default();
        let xml_url = outline.xml_url.as_deref().unwrap_or_default();
        println!("{}\t{}\t{}", folder, outline.label(), xml_url);
        count += 1;
    }
    if count == 0 {
        eprintln!("Warning: No feed subscriptions found");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let factory = OpmlFactory::xml(&config).context("Failed to set up OPML factory")?;

    match args.command {
        Command::Tree { source } => {
            let document = factory
                .read(&source)
                .await
                .with_context(|| format!("Failed to read '{}'", source))?;
            print_tree(&document);
        }
        Command::Feeds { source } => {
            let document = factory
                .read(&source)
                .await
                .with_context(|| format!("Failed to read '{}'", source))?;
            print_feeds(&document);
        }
        Command::Convert {
            source,
            destination,
            title,
        } => {
            let mut document = factory
                .read(&source)
                .await
                .with_context(|| format!("Failed to read '{}'", source))?;
            if let Some(title) = title {
                document.edit_head(|head| head.title = Some(title));
            }
            factory
                .write(&destination, &document)
                .await
                .with_context(|| format!("Failed to write '{}'", destination))?;
            println!(
                "Wrote {} outlines to {}",
                document.len(),
                destination
            );
        }
    }

    Ok(())
}
