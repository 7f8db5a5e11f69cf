use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use maint_core::AppConfig;
use maint_triage::RandomSelector;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Configuration file (.toml, .yaml or .yml)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("maintctl")
        .version(maint_core::VERSION)
        .about("Insta-Maintain operator tool")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("classify")
                .about("Classify a description and assign a contractor")
                .arg(
                    Arg::new("description")
                        .required(true)
                        .help("Issue description"),
                )
                .arg(config_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Seed for reproducible contractor selection"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("role")
                .about("Resolve the role of an email")
                .arg(Arg::new("email").required(true).help("Login email"))
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate a configuration file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Configuration file"),
                ),
        )
        .subcommand(
            Command::new("categories")
                .about("List categories in tie-break order")
                .arg(config_arg())
                .arg(json_arg()),
        )
}

fn load_config(matches: &ArgMatches) -> Result<AppConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn classify(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let description = matches
        .get_one::<String>("description")
        .map(String::as_str)
        .unwrap_or_default();

    let triage = match matches.get_one::<u64>("seed") {
        Some(seed) => config.build_triage_with(Arc::new(RandomSelector::seeded(*seed)))?,
        None => config.build_triage()?,
    };
    let outcome = triage.triage(description);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let c = &outcome.classification;
        println!("category:   {}", c.category);
        println!("priority:   {}", c.priority);
        println!("confidence: {:.2}", c.confidence);
        println!("matched:    {}", c.matched_keywords.join(", "));
        println!("contractor: {}", outcome.contractor);
        println!("reason:     {}", c.explanation);
    }
    Ok(())
}

fn role(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let email = matches
        .get_one::<String>("email")
        .map(String::as_str)
        .unwrap_or_default();

    let role = config.role_resolver().resolve_role(email);
    println!("{email}: {role} ({})", role.title());
    Ok(())
}

fn check_config(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("path")
        .context("missing configuration path")?;
    let config = AppConfig::load(path)
        .with_context(|| format!("checking {}", path.display()))?;

    println!("{}: ok", path.display());
    println!("  admins:      {}", config.access.admin.len());
    println!("  contractors: {}", config.access.contractor.len());
    println!("  categories:  {}", config.triage.categories.categories().len());
    println!("  pools:       {}", config.triage.contractors.pools.len());
    println!("  lifecycle:   {:?}", config.lifecycle);
    Ok(())
}

fn categories(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let table = &config.triage.categories;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(table)?);
        return Ok(());
    }
    for profile in table.iter() {
        println!(
            "{:<40} {:<9} {}",
            profile.category.as_str(),
            profile.priority.as_str(),
            profile.keywords.join(", ")
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("classify", sub)) => classify(sub),
        Some(("role", sub)) => role(sub),
        Some(("check-config", sub)) => check_config(sub),
        Some(("categories", sub)) => categories(sub),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn classify_accepts_seed_and_json() {
        let matches = cli()
            .try_get_matches_from(["maintctl", "classify", "leaking pipe", "--seed", "3", "--json"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "classify");
        assert_eq!(sub.get_one::<u64>("seed"), Some(&3));
        assert!(sub.get_flag("json"));
    }
}
