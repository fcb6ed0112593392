//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use themer::build_info;
use themer::worker::{ThemeRequest, ThemeSection};

/// Installs and applies device theme packages.
#[derive(Debug, Parser)]
#[command(name = "themer", version, long_version = build_info::LONG_VERSION)]
pub struct Args {
    /// Path to config file (default: ./themer.toml or ~/.config/themer/themer.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the worker and read one JSON request per line from stdin.
    Serve,
    /// Install the theme package at URI, replacing the current theme.
    Apply { uri: String },
    /// Remove the installed theme.
    Remove,
    /// Remove the installed theme and tell the host to reload.
    RemoveAndApply,
    /// Re-apply the installed theme.
    ApplyInstalled,
    /// Apply one section of the installed theme.
    Section {
        #[arg(value_enum)]
        section: ThemeSection,
    },
    /// Print the resolved configuration.
    Config {
        /// Print the default config file instead.
        #[arg(long)]
        template: bool,
    },
}

impl Command {
    /// The single request a one-shot command submits.
    pub fn one_shot_request(&self) -> Option<ThemeRequest> {
        match self {
            Self::Apply { uri } => Some(ThemeRequest::ApplyFromSource { uri: uri.clone() }),
            Self::Remove => Some(ThemeRequest::RemoveTheme),
            Self::RemoveAndApply => Some(ThemeRequest::RemoveThenApplyCurrent),
            Self::ApplyInstalled => Some(ThemeRequest::ApplyCurrent),
            Self::Section { section } => Some(ThemeRequest::ApplySection { section: *section }),
            Self::Serve | Self::Config { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_parse_kebab_case() {
        let args = Args::parse_from(["themer", "section", "boot-animation"]);
        assert_eq!(
            args.command.one_shot_request(),
            Some(ThemeRequest::ApplySection {
                section: ThemeSection::BootAnimation
            })
        );
        let args = Args::parse_from(["themer", "section", "system-ui"]);
        assert!(matches!(
            args.command,
            Command::Section {
                section: ThemeSection::SystemUi
            }
        ));
    }

    #[test]
    fn config_flag_precedes_subcommand() {
        let args = Args::parse_from(["themer", "-c", "/etc/themer.toml", "apply", "file:///t.zip"]);
        assert_eq!(args.config.as_deref(), Some("/etc/themer.toml"));
        assert_eq!(
            args.command.one_shot_request(),
            Some(ThemeRequest::ApplyFromSource {
                uri: "file:///t.zip".into()
            })
        );
    }

    #[test]
    fn serve_and_config_are_not_one_shot() {
        assert_eq!(Args::parse_from(["themer", "serve"]).command.one_shot_request(), None);
        let args = Args::parse_from(["themer", "config", "--template"]);
        assert!(matches!(args.command, Command::Config { template: true }));
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(Args::try_parse_from(["themer", "section", "fonts"]).is_err());
    }
}
