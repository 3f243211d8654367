//
//  git-weblinks
//  selection/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Selection Model
//!
//! Value types for line/column ranges and the conversions between them.
//!
//! Two flavours of range exist:
//!
//! - [`SelectedRange`]: a fully known, 1-based, inclusive range. This is what
//!   the forward path renders into a URL.
//! - [`PartialSelectedRange`]: the same four fields, each optional and
//!   unbounded. This is what the reverse path pulls out of a URL, where a
//!   provider may omit the columns or the end line, and where the numbers may
//!   no longer fit the file they point into.
//!
//! [`clamp`] turns the second into the first against a concrete document, and
//! [`to_selection`] converts a range into the 0-based positions editors use.
//!
//! ```rust
//! use git_weblinks::selection::{clamp, PartialSelectedRange};
//!
//! let partial: PartialSelectedRange = "10-12".parse().unwrap();
//! let lines = ["a"; 20];
//! let range = clamp(&partial, 20, |n| lines[n as usize - 1].len() as u32).unwrap();
//!
//! assert_eq!((range.start_line, range.end_line), (10, 12));
//! assert_eq!((range.start_column, range.end_column), (1, 2));
//! ```

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// A fully known selection. All fields are 1-based and inclusive.
///
/// `start_line <= end_line`, and on a single line `start_column <= end_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SelectedRange {
    /// Creates a range covering whole lines, with columns left at their
    /// line-start defaults.
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            start_column: 1,
            end_line,
            end_column: 1,
        }
    }

    /// Short label used after `#` in markdown link text, e.g. `L10-L12`.
    pub fn label(&self) -> String {
        if self.start_line == self.end_line {
            format!("L{}", self.start_line)
        } else {
            format!("L{}-L{}", self.start_line, self.end_line)
        }
    }
}

impl fmt::Display for SelectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// A selection decoded from a URL, where any field may be unknown.
///
/// The values are signed and unbounded on purpose: they come from text that
/// may be stale or hand-edited, and [`clamp`] is the only place that decides
/// what they mean for a concrete file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSelectedRange {
    pub start_line: Option<i64>,
    pub start_column: Option<i64>,
    pub end_line: Option<i64>,
    pub end_column: Option<i64>,
}

impl PartialSelectedRange {
    /// Returns true when nothing at all is known about the selection.
    pub fn is_empty(&self) -> bool {
        self.start_line.is_none()
            && self.start_column.is_none()
            && self.end_line.is_none()
            && self.end_column.is_none()
    }
}

impl From<SelectedRange> for PartialSelectedRange {
    fn from(range: SelectedRange) -> Self {
        Self {
            start_line: Some(range.start_line.into()),
            start_column: Some(range.start_column.into()),
            end_line: Some(range.end_line.into()),
            end_column: Some(range.end_column.into()),
        }
    }
}

/// Parses `LINE`, `LINE-LINE`, `LINE:COL` or `LINE:COL-LINE:COL`.
impl FromStr for PartialSelectedRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn position(text: &str) -> anyhow::Result<(i64, Option<i64>)> {
            let mut parts = text.splitn(2, ':');
            let line = parts.next().unwrap_or_default().trim();
            if line.is_empty() {
                bail!("Missing line number in '{}'", text);
            }
            let line = line
                .parse()
                .with_context(|| format!("Invalid line number '{}'", line))?;
            let column = match parts.next() {
                Some(col) => Some(
                    col.trim()
                        .parse()
                        .with_context(|| format!("Invalid column number '{}'", col))?,
                ),
                None => None,
            };
            Ok((line, column))
        }

        let s = s.trim();
        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (start, Some(end)),
            None => (s, None),
        };

        let (start_line, start_column) = position(start)?;
        let (end_line, end_column) = match end {
            Some(end) => {
                let (line, column) = position(end)?;
                (Some(line), column)
            }
            None => (None, None),
        };

        Ok(Self {
            start_line: Some(start_line),
            start_column,
            end_line,
            end_column,
        })
    }
}

/// A 0-based position as editors and language servers count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// A 0-based, end-exclusive selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditorSelection {
    pub start: Position,
    pub end: Position,
}

/// Converts a 1-based range into 0-based editor positions.
///
/// An end that sits at the very start of a line after the start line is
/// pulled back to the end of the previous line, so a selection made by
/// dragging to the beginning of line N+1 reports lines up to N only.
///
/// `line_length` receives a 1-based line number and returns its length in
/// characters.
pub fn to_selection<F>(range: &SelectedRange, line_length: F) -> EditorSelection
where
    F: Fn(u32) -> u32,
{
    let start = Position {
        line: range.start_line.saturating_sub(1),
        character: range.start_column.saturating_sub(1),
    };
    let mut end = Position {
        line: range.end_line.saturating_sub(1),
        character: range.end_column.saturating_sub(1),
    };

    if end.character == 0 && end.line > start.line {
        end.line -= 1;
        end.character = line_length(end.line + 1);
    }

    EditorSelection { start, end }
}

/// Fits a partial range onto a document with `line_count` lines.
///
/// Returns `None` when the start line is unknown; there is nothing to select
/// in that case. Otherwise the result always lies inside the document:
///
/// - lines are clamped to `[1, line_count]`;
/// - a missing end line selects through the start line;
/// - a missing start column is 1, a missing end column is one past the last
///   character of the end line;
/// - explicit columns are clamped to `[1, line_length + 1]`.
///
/// Ranges given backwards are turned around.
pub fn clamp<F>(range: &PartialSelectedRange, line_count: u32, line_length: F) -> Option<SelectedRange>
where
    F: Fn(u32) -> u32,
{
    let line_count = line_count.max(1);
    let mut start_line = clamp_to(range.start_line?, line_count);
    let mut end_line = range
        .end_line
        .map(|line| clamp_to(line, line_count))
        .unwrap_or(start_line);

    let mut start_column = range.start_column;
    let mut end_column = range.end_column;
    if end_line < start_line {
        std::mem::swap(&mut start_line, &mut end_line);
        std::mem::swap(&mut start_column, &mut end_column);
    }

    let start_limit = line_length(start_line).saturating_add(1);
    let end_limit = line_length(end_line).saturating_add(1);
    let mut start_column = start_column
        .map(|col| clamp_to(col, start_limit))
        .unwrap_or(1);
    let mut end_column = end_column
        .map(|col| clamp_to(col, end_limit))
        .unwrap_or(end_limit);

    if start_line == end_line && start_column > end_column {
        std::mem::swap(&mut start_column, &mut end_column);
    }

    Some(SelectedRange {
        start_line,
        start_column,
        end_line,
        end_column,
    })
}

fn clamp_to(value: i64, max: u32) -> u32 {
    // `max` is at least 1 for every caller.
    value.clamp(1, i64::from(max.max(1))) as u32
}
