//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use crate::cli::{
    ConfigArgs, ConfigCommand, DEFAULT_ALERT_THRESHOLD, DEFAULT_DURATION_MINUTES, GlobalOpts,
    MAX_DURATION_MINUTES,
};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with every plaintext password masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    out
}

/// Table view of `config show`: the config as it would be written.
fn config_toml(cfg: &Config) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(cfg)?)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask where the password lives. Returns `(password, password_env)`.
fn prompt_password_storage() -> Result<(Option<String>, Option<String>), CliError> {
    let choices = &[
        "Read from an environment variable (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the password come from?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        let var: String = Input::new()
            .with_prompt("Environment variable")
            .default("LS_PASSWORD".into())
            .interact_text()
            .map_err(prompt_err)?;
        return Ok((None, Some(var)));
    }

    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok((Some(pass), None))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let format = config::output_format(global, &cfg);
            let out = output::render_single(format, &redacted(&cfg), config_toml)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

/// Interactive wizard that adds (or replaces) one profile.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("licmon configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config()?;

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Server
    let ls_uri: String = Input::new()
        .with_prompt("License server URL or cloud service id")
        .validate_with(|input: &String| {
            licmon_config::resolve_endpoint(input, None)
                .map(drop)
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Credentials
    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;
    let (password, password_env) = prompt_password_storage()?;

    // 4. Monitoring defaults
    let duration_minutes: u64 = Input::new()
        .with_prompt("Reporting window (minutes)")
        .default(DEFAULT_DURATION_MINUTES)
        .validate_with(|m: &u64| {
            if (1..=MAX_DURATION_MINUTES).contains(m) {
                Ok(())
            } else {
                Err(format!("must be between 1 and {MAX_DURATION_MINUTES}"))
            }
        })
        .interact_text()
        .map_err(prompt_err)?;
    let alert_threshold: u8 = Input::new()
        .with_prompt("Alert threshold (%)")
        .default(DEFAULT_ALERT_THRESHOLD)
        .validate_with(|p: &u8| {
            if *p <= 100 {
                Ok(())
            } else {
                Err("must be between 0 and 100".to_owned())
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let make_default = cfg.profiles.is_empty()
        || Confirm::new()
            .with_prompt(format!("Make '{profile_name}' the default profile?"))
            .default(true)
            .interact()
            .map_err(prompt_err)?;

    // 5. Build profile and write
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            ls_uri: Some(ls_uri),
            username: Some(username),
            password,
            password_env,
            duration_minutes: Some(duration_minutes),
            alert_threshold: Some(alert_threshold),
            ..Profile::default()
        },
    );
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }

    let written = config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", written.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: licmon --profile {profile_name} features");
    Ok(())
}
