//
//  git-weblinks
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Getting, setting and listing the scalar settings. Servers are tables
//! in the file and are edited there; `list` shows them.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::CONFIG_KEYS;
use crate::links::ServerSpec;

use super::GlobalOptions;

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset a configuration value
    Unset(UnsetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key
    pub key: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::Unset(args) => self.unset(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::Path => self.path(global),
        }
    }

    fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        if !CONFIG_KEYS.contains(&args.key.as_str()) {
            bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                args.key,
                CONFIG_KEYS.join(", ")
            );
        }
        let config = global.load_config()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }
        Ok(())
    }

    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        let mut config = global.load_config()?;
        config.set(&args.key, &args.value)?;
        config.save(global.config.as_deref())?;

        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": args.value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            global.output().write_success(&format!("Set {} = {}", args.key, args.value));
        }
        Ok(())
    }

    fn unset(&self, args: &UnsetArgs, global: &GlobalOptions) -> Result<()> {
        let mut config = global.load_config()?;
        config.unset(&args.key)?;
        config.save(global.config.as_deref())?;

        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            global.output().write_success(&format!("Unset {}", args.key));
        }
        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }

        println!();
        println!("{}", style("Settings").bold());
        println!("{}", "-".repeat(50));
        for key in CONFIG_KEYS {
            print_kv(key, config.get(key).as_deref());
        }

        if !config.servers.is_empty() {
            println!();
            println!("{}", style("Servers").bold());
            println!("{}", "-".repeat(50));
            let mut keys: Vec<&String> = config.servers.keys().collect();
            keys.sort();
            for key in keys {
                println!("  {}", style(key).cyan().bold());
                for server in &config.servers[key] {
                    println!("    {}", describe(server));
                }
            }
        }

        println!();
        Ok(())
    }

    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let config_path = global.config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": config_path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", config_path.display());
        }
        Ok(())
    }
}

fn print_kv(key: &str, value: Option<&str>) {
    println!("  {}: {}", style(key).cyan(), value.unwrap_or("-"));
}

fn describe(server: &ServerSpec) -> String {
    match server {
        ServerSpec::Static(s) => match &s.ssh {
            Some(ssh) => format!("{} ({})", s.http, ssh),
            None => s.http.clone(),
        },
        ServerSpec::Dynamic(d) => format!("/{}/ -> {}", d.remote_pattern, d.http),
    }
}
