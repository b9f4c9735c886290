//! PDF Catalog CLI tool
//!
//! A command-line tool for inspecting the object tree of PDF files.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use glob::glob;
use log::warn;
use std::path::{Path, PathBuf};
use std::process;

use pdf_catalog::date::format_date;
use pdf_catalog::pdf::{
    form_fields, links, outline, page_tree, Action, ActionResolver, CancelToken, OutlineItem,
    PdfDocument,
};
use pdf_catalog::Error;

/// PDF Catalog - Inspect pages, form fields, links and bookmarks of PDF files
#[derive(Parser)]
#[command(name = "pdf-catalog")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Show metadata of every PDF in a directory
    pdf-catalog info \"handouts/*.pdf\"

    # List form fields of an encrypted form
    pdf-catalog --password secret fields application.pdf

    # Show where a named destination points
    pdf-catalog dest manual.pdf chapter-3

    # Trace the walk
    RUST_LOG=debug pdf-catalog links manual.pdf")]
struct Cli {
    /// Password for encrypted documents
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about PDF files
    Info {
        /// Input PDF files. Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// List pages with their MediaBox and annotation count
    Pages {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// List AcroForm fields
    Fields {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// List link annotations and their targets
    Links {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Print the bookmark tree
    Outline {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Resolve a named destination to a page number
    Dest {
        /// PDF file to inspect
        input: PathBuf,

        /// Destination name
        name: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let password = cli.password.as_deref();

    let result = match cli.command {
        Commands::Info { inputs } => cmd_info(inputs, password),
        Commands::Pages { input } => cmd_pages(&input, password),
        Commands::Fields { input } => cmd_fields(&input, password),
        Commands::Links { input } => cmd_links(&input, password),
        Commands::Outline { input } => cmd_outline(&input, password),
        Commands::Dest { input, name } => cmd_dest(&input, &name, password),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> pdf_catalog::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(&pattern).map_err(|e| Error::InvalidGlob(e.to_string()))?;
            let mut matched = false;
            for entry in entries {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => warn!("Glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                return Err(Error::NoFilesMatched(pattern));
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

fn open(input: &Path, password: Option<&str>) -> anyhow::Result<PdfDocument> {
    PdfDocument::open(input, password).with_context(|| format!("Opening {}", input.display()))
}

fn describe(action: &Action) -> String {
    match action {
        Action::GoTo(page) => format!("page {}", page),
        Action::OpenUrl(url) => url.clone(),
    }
}

/// Show information about PDF files
fn cmd_info(inputs: Vec<String>, password: Option<&str>) -> anyhow::Result<()> {
    let inputs = expand_globs(inputs)?;

    for path in &inputs {
        let info = open(path, password)?.info();

        println!("File: {}", path.display());
        println!("  Version:  {}", info.version);
        println!("  Pages:    {}", info.page_count);
        if let Some(declared) = info.declared_page_count.filter(|d| *d != info.page_count) {
            println!("  Declared: {} (page tree Count)", declared);
        }
        let fields = [
            ("Title", &info.title),
            ("Author", &info.author),
            ("Subject", &info.subject),
            ("Keywords", &info.keywords),
            ("Creator", &info.creator),
            ("Producer", &info.producer),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                println!("  {:<9} {}", format!("{}:", label), value);
            }
        }
        if let Some(created) = &info.creation_date {
            println!("  Created:  {}", format_date(created));
        }
        if let Some(modified) = &info.modification_date {
            println!("  Modified: {}", format_date(modified));
        }
        println!("  Form:     {}", if info.has_form { "yes" } else { "no" });
    }

    Ok(())
}

/// List pages
fn cmd_pages(input: &Path, password: Option<&str>) -> anyhow::Result<()> {
    let doc = open(input, password)?;

    for page in page_tree(&doc, &CancelToken::new())? {
        let media_box = page
            .media_box
            .map(|rect| rect.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:?}  {}  {} annotations",
            page.number,
            page.id(),
            media_box,
            page.annotations.len()
        );
    }

    Ok(())
}

/// List form fields
fn cmd_fields(input: &Path, password: Option<&str>) -> anyhow::Result<()> {
    let doc = open(input, password)?;
    let fields = form_fields(&doc, &CancelToken::new())?;

    if fields.is_empty() {
        eprintln!("No form fields");
        return Ok(());
    }

    for field in fields {
        let kind = field.field_type.map(|t| t.pdf_name()).unwrap_or("?");
        let page = field
            .page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        print!("{:<4} page {:<4} {}", kind, page, field.full_name);
        if let Some(value) = &field.value {
            print!(" = {:?}", value);
        }
        if let Some(export) = &field.export_value {
            print!(" (on: {})", export);
        }
        println!();
    }

    Ok(())
}

/// List links
fn cmd_links(input: &Path, password: Option<&str>) -> anyhow::Result<()> {
    let doc = open(input, password)?;

    for link in links(&doc, &CancelToken::new())? {
        let rect = link
            .rect
            .map(|rect| rect.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("page {:<4} {} -> {}", link.page, rect, describe(&link.action));
    }

    Ok(())
}

fn print_outline(items: &[OutlineItem]) {
    for item in items {
        let target = item
            .action
            .as_ref()
            .map(describe)
            .unwrap_or_else(|| "-".to_string());
        println!("{}{} -> {}", "  ".repeat(item.depth), item.title, target);
        print_outline(&item.children);
    }
}

/// Print the outline
fn cmd_outline(input: &Path, password: Option<&str>) -> anyhow::Result<()> {
    let doc = open(input, password)?;
    let items = outline(&doc, &CancelToken::new())?;

    if items.is_empty() {
        eprintln!("No outline");
    }
    print_outline(&items);

    Ok(())
}

/// Resolve a named destination
fn cmd_dest(input: &Path, name: &str, password: Option<&str>) -> anyhow::Result<()> {
    let doc = open(input, password)?;
    let resolver = ActionResolver::new(&doc);

    match resolver.named_destination_page(name) {
        Some(page) => {
            println!("{} -> page {}", name, page);
            Ok(())
        }
        None => {
            let known = resolver.destination_names();
            if !known.is_empty() {
                eprintln!("Known destinations: {}", known.join(", "));
            }
            bail!("Destination {:?} not found in {}", name, input.display())
        }
    }
}
