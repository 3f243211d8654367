//
//  git-weblinks
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! How commands print their results.
//!
//! - **Text**: tables and plain lines for people at a terminal
//! - **JSON**: pretty-printed `serde_json` for scripts (`--json`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use git_weblinks::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_list(&located_files)?;
//! writer.write_warning("2 files match the link");
//! ```

mod table;

pub use table::*;

use std::io::Write;

use serde::Serialize;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tables and plain text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Writes command results in the chosen format.
///
/// Color is detected once from the terminal with `console`.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes one value: its JSON form, or `text` in text mode.
    pub fn write<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json_to(&mut std::io::stdout().lock(), value),
            OutputFormat::Text => {
                println!("{}", text());
                Ok(())
            }
        }
    }

    /// Writes a list: a JSON array, or a table in text mode.
    pub fn write_list<T: Serialize + TableOutput>(&self, values: &[T]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json_to(&mut std::io::stdout().lock(), &values),
            OutputFormat::Text => {
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::headers().iter().copied())
                    .rows(values.iter().map(TableOutput::row))
                    .print();
                Ok(())
            }
        }
    }

    /// A progress note on stderr.
    pub fn write_info(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("→").cyan(), msg);
        } else {
            eprintln!("→ {}", msg);
        }
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("✓").green().bold(), msg);
        } else {
            eprintln!("✓ {}", msg);
        }
    }
}

/// Pretty-prints `value` as JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Types that can be listed as rows of a table.
///
/// # Example
///
/// ```rust
/// use git_weblinks::output::TableOutput;
///
/// struct Remote {
///     name: String,
///     url: String,
/// }
///
/// impl TableOutput for Remote {
///     fn headers() -> &'static [&'static str] {
///         &["Remote", "URL"]
///     }
///
///     fn row(&self) -> Vec<String> {
///         vec![self.name.clone(), self.url.clone()]
///     }
/// }
/// ```
pub trait TableOutput {
    fn headers() -> &'static [&'static str];

    fn row(&self) -> Vec<String>;
}
