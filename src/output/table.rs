//
//  git-weblinks
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Tables
//!
//! `comfy_table` tables with UTF-8 borders that fit the terminal width.
//!
//! ```rust
//! use git_weblinks::output::TableBuilder;
//!
//! let table = TableBuilder::new()
//!     .color(false)
//!     .headers(["Type", "Ref"])
//!     .row(["branch", "main"])
//!     .build();
//! assert!(table.to_string().contains("main"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

/// Builds a table row by row.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        Self {
            table,
            color: console::colors_enabled(),
        }
    }

    /// Enables or disables colored headers. Call before [`headers`](Self::headers).
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let color = self.color;
        let cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| {
                let cell = Cell::new(h.into());
                if color {
                    cell.fg(Color::Cyan)
                } else {
                    cell
                }
            })
            .collect();
        self.table.set_header(cells);
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.add_row(cells.into_iter().map(Into::into).collect::<Vec<String>>());
        self
    }

    pub fn rows<I, R, S>(self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        rows.into_iter().fold(self, |builder, row| builder.row(row))
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shows `value`, or a dash when it is empty.
pub fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
