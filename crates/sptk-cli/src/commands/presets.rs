//! Analysis preset commands.
//!
//! Lists, shows and copies the presets accepted by `--preset`.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use sptk_config::{
    AnalysisPreset, ensure_user_presets_dir, factory_presets, find_preset, get_factory_preset,
    list_user_presets, preset_name_from_path, user_config_dir, user_presets_dir,
};

#[derive(Args, Debug)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand, Debug)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long, conflicts_with = "user")]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show the parameters of a preset
    Show {
        /// Preset name or path
        name: String,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Copy a factory preset to the user presets for customization
    Copy {
        /// Factory preset name
        source: String,

        /// New preset name [default: the source name]
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show preset directories
    Paths,
}

pub fn run(args: PresetsArgs) -> Result<()> {
    match args.command {
        PresetsCommand::List { factory, user } => list_presets(!user, !factory),
        PresetsCommand::Show { name, json } => show_preset(&name, json),
        PresetsCommand::Copy { source, name } => copy_preset(&source, name.as_deref()),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            println!("Config dir:   {}", user_config_dir().display());
            Ok(())
        }
    }
}

fn summary_line(preset: &AnalysisPreset) -> String {
    format!(
        "{:12} {:>6} Hz  m={:<3} a={:.2} l={:<5} {}",
        preset.name,
        preset.sample_rate,
        preset.order,
        preset.alpha(),
        preset.fft_length,
        preset.description.as_deref().unwrap_or("")
    )
}

fn list_presets(show_factory: bool, show_user: bool) -> Result<()> {
    if show_factory {
        println!("Factory presets:");
        for preset in factory_presets() {
            println!("  {}", summary_line(&preset));
        }
    }

    if show_user {
        if show_factory {
            println!();
        }
        println!("User presets:");
        let paths = list_user_presets();
        if paths.is_empty() {
            println!("  (none)");
        }
        for path in paths {
            let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
            match AnalysisPreset::load(&path) {
                Ok(preset) => println!("  {}", summary_line(&preset)),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "unreadable user preset");
                    println!("  {name:12} (error loading)");
                }
            }
        }
    }

    Ok(())
}

fn show_preset(name: &str, json: bool) -> Result<()> {
    let preset = find_preset(name).with_context(|| format!("cannot load preset '{name}'"))?;
    let text = if json {
        serde_json::to_string_pretty(&preset).context("failed to serialize preset")?
    } else {
        preset.to_toml()?
    };
    println!("{}", text.trim_end());
    if !json && preset.alpha.is_none() {
        println!("# alpha = {} (from sample_rate)", preset.alpha());
    }
    Ok(())
}

fn copy_preset(source: &str, new_name: Option<&str>) -> Result<()> {
    let Some(preset) = get_factory_preset(source) else {
        bail!("factory preset '{source}' not found");
    };
    let target = new_name.unwrap_or(source);

    let path = ensure_user_presets_dir()?.join(format!("{target}.toml"));
    if path.exists() {
        bail!("user preset '{target}' already exists; choose another name with --name");
    }

    let description = preset.description.clone();
    let mut copy = AnalysisPreset { name: target.to_string(), ..preset };
    copy.description = description.map(|d| format!("{d} (copy)"));
    copy.save(&path)?;

    println!("Copied factory preset '{source}' to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_shows_derived_alpha() {
        let preset = AnalysisPreset::new("custom").with_sample_rate(8000);
        let line = summary_line(&preset);
        assert!(line.starts_with("custom"));
        assert!(line.contains("a=0.31"), "got: {line}");
    }

    #[test]
    fn test_copy_rejects_unknown_source() {
        assert!(copy_preset("no-such-preset", None).is_err());
    }
}
