//
//  git-weblinks
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive prompts
//!
//! Thin wrappers over `dialoguer` for the few places a command has to ask:
//! mostly when a link decodes to more than one file.
//!
//! ```no_run
//! use git_weblinks::interactive::choose;
//!
//! let files = vec!["app/src/main.ts", "lib/src/main.ts"];
//! if let Some(idx) = choose("Which file?", &files, true).unwrap() {
//!     println!("Opening {}", files[idx]);
//! }
//! ```

use anyhow::Result;
use dialoguer::{FuzzySelect, Select};

/// Above this many items the prompt switches to fuzzy search.
const FUZZY_THRESHOLD: usize = 10;

/// Asks the user to pick one of `items`.
///
/// # Returns
///
/// - `Ok(Some(index))` - The chosen item
/// - `Ok(None)` - Nothing to choose from, or the user pressed Escape
///
/// A single item is returned without asking. With `prompt` off the first
/// item is taken.
pub fn choose<T: ToString>(message: &str, items: &[T], prompt: bool) -> Result<Option<usize>> {
    match items.len() {
        0 => return Ok(None),
        1 => return Ok(Some(0)),
        _ if !prompt => return Ok(Some(0)),
        _ => {}
    }

    let selection = if items.len() > FUZZY_THRESHOLD {
        FuzzySelect::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact_opt()?
    } else {
        Select::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact_opt()?
    };
    Ok(selection)
}
