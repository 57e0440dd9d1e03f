// src/cli.rs
use std::collections::BTreeSet;

use crate::app::{ProfileUpdate, Region, ServiceName, UserProfile};

pub const USAGE: &str = "Usage:
  moviefinder browse [limit]
  moviefinder settings --name <name> --region <code> --services <a,b,..> [--password <pw> --confirm <pw>]
  moviefinder like <id>
  moviefinder reject <id>
  moviefinder liked";

/// Parsed command line. Settings flags stay raw until the current profile is
/// known, since missing flags fall back to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Browse { limit: Option<usize> },
    Settings(Vec<String>),
    Like(String),
    Reject(String),
    Liked,
}

/// Checks the command shape without touching the data directory.
pub fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some(cmd) = args.first() else {
        return Err("missing command".into());
    };
    match (cmd.as_str(), args.get(1)) {
        ("browse", None) => Ok(Command::Browse { limit: None }),
        ("browse", Some(raw)) => raw
            .parse()
            .map(|n| Command::Browse { limit: Some(n) })
            .map_err(|_| format!("limit must be a number, got `{raw}`")),
        ("settings", _) => Ok(Command::Settings(args[1..].to_vec())),
        ("like", Some(id)) => Ok(Command::Like(id.clone())),
        ("reject", Some(id)) => Ok(Command::Reject(id.clone())),
        ("like" | "reject", None) => Err(format!("`{cmd}` needs an item id")),
        ("liked", _) => Ok(Command::Liked),
        _ => Err(format!("unknown command `{cmd}`")),
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

/// Builds the settings submission; flags left out keep the current profile's
/// values, and are required when there is no profile yet.
pub fn parse_settings(args: &[String], current: Option<&UserProfile>) -> Result<ProfileUpdate, String> {
    let name = flag_value(args, "--name")
        .or_else(|| current.map(|p| p.name.clone()))
        .ok_or("--name is required on first run")?;
    let region = match flag_value(args, "--region") {
        Some(code) => Region::from_str(&code).ok_or_else(|| {
            let known: Vec<&str> = Region::ALL.iter().map(|r| r.as_str()).collect();
            format!("unknown region `{code}` (known: {})", known.join(", "))
        })?,
        None => current
            .map(|p| p.region)
            .ok_or("--region is required on first run")?,
    };
    let services: BTreeSet<ServiceName> = match flag_value(args, "--services") {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ServiceName::from_str(s).ok_or_else(|| format!("unknown service `{s}`")))
            .collect::<Result<_, _>>()?,
        None => current
            .map(|p| p.services.clone())
            .ok_or("--services is required on first run")?,
    };
    let password = flag_value(args, "--password").unwrap_or_default();
    let confirm_password = flag_value(args, "--confirm").unwrap_or_default();
    Ok(ProfileUpdate {
        name,
        region,
        services,
        password,
        confirm_password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command(&args("browse")), Ok(Command::Browse { limit: None }));
        assert_eq!(
            parse_command(&args("browse 5")),
            Ok(Command::Browse { limit: Some(5) })
        );
        assert_eq!(parse_command(&args("like tt1")), Ok(Command::Like("tt1".into())));
        assert_eq!(parse_command(&args("reject tt1")), Ok(Command::Reject("tt1".into())));
        assert_eq!(parse_command(&args("liked")), Ok(Command::Liked));
        assert_eq!(
            parse_command(&args("settings --name Ada")),
            Ok(Command::Settings(args("--name Ada")))
        );
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert!(parse_command(&[]).is_err());
        assert!(parse_command(&args("browse abc")).is_err());
        assert!(parse_command(&args("browse -1")).is_err());
        assert!(parse_command(&args("like")).is_err());
        assert!(parse_command(&args("rate tt1")).is_err());
    }

    #[test]
    fn first_run_requires_every_field() {
        let err = parse_settings(&args("--region US --services netflix"), None).unwrap_err();
        assert!(err.contains("--name"));
        let err = parse_settings(&args("--name Ada --services netflix"), None).unwrap_err();
        assert!(err.contains("--region"));
        let err = parse_settings(&args("--name Ada --region US"), None).unwrap_err();
        assert!(err.contains("--services"));

        let u = parse_settings(&args("--name Ada --region us --services netflix,hulu"), None).unwrap();
        assert_eq!(u.region, Region::Us);
        assert_eq!(u.services, BTreeSet::from([ServiceName::Hulu, ServiceName::Netflix]));
        assert!(u.password.is_empty());
    }

    #[test]
    fn missing_flags_fall_back_to_current_profile() {
        let current = UserProfile::new("Ada", Region::Ca, BTreeSet::from([ServiceName::Hulu]));
        let u = parse_settings(&args("--services disney+ --password longenough1 --confirm longenough1"), Some(&current))
            .unwrap();
        assert_eq!(u.name, "Ada");
        assert_eq!(u.region, Region::Ca);
        assert_eq!(u.services, BTreeSet::from([ServiceName::DisneyPlus]));
        assert_eq!(u.password, "longenough1");
        assert_eq!(u.confirm_password, "longenough1");
    }

    #[test]
    fn unknown_values_are_reported() {
        let current = UserProfile::new("Ada", Region::Ca, BTreeSet::from([ServiceName::Hulu]));
        assert!(parse_settings(&args("--region FR"), Some(&current))
            .unwrap_err()
            .contains("unknown region `FR`"));
        assert!(parse_settings(&args("--services netflix,peacock"), Some(&current))
            .unwrap_err()
            .contains("unknown service `peacock`"));
    }
}
