//
//  git-weblinks
//  cli/completion.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Shell completion commands

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::APP_NAME;

use super::{Cli, GlobalOptions};

/// Generate shell completion scripts
///
/// For example, for bash: `gwl completion bash > ~/.local/share/bash-completion/completions/gwl`
#[derive(Args, Debug)]
pub struct CompletionCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionCommand {
    pub async fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, APP_NAME, &mut std::io::stdout());
        Ok(())
    }
}
