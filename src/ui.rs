// UI layer: numbered text menu driven by `dialoguer` prompts. Each handler
// collects the fields for one operation, runs it under a spinner and prints
// either the rendered payload or the error. Errors never leave the loop.

use std::time::Duration;

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ApiClient, DeployParams, PowerAction, RebuildParams};
use crate::error::{ClientError, MenuError};
use crate::render;

/// Entries of the main menu, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    ListInstances,
    Deploy,
    Destroy,
    Power,
    Rebuild,
    ListPlans,
    OsByPlan,
    Renew,
    State,
    ListSshKeys,
    EvoPermissions,
    UserInfo,
}

impl MenuChoice {
    const ORDERED: [MenuChoice; 13] = [
        MenuChoice::Exit,
        MenuChoice::ListInstances,
        MenuChoice::Deploy,
        MenuChoice::Destroy,
        MenuChoice::Power,
        MenuChoice::Rebuild,
        MenuChoice::ListPlans,
        MenuChoice::OsByPlan,
        MenuChoice::Renew,
        MenuChoice::State,
        MenuChoice::ListSshKeys,
        MenuChoice::EvoPermissions,
        MenuChoice::UserInfo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Exit => "Exit",
            MenuChoice::ListInstances => "List instances",
            MenuChoice::Deploy => "Deploy a new instance",
            MenuChoice::Destroy => "Destroy an instance",
            MenuChoice::Power => "Power action",
            MenuChoice::Rebuild => "Rebuild an instance",
            MenuChoice::ListPlans => "List available plans",
            MenuChoice::OsByPlan => "Get operating systems for a plan",
            MenuChoice::Renew => "Renew an instance",
            MenuChoice::State => "Get instance state",
            MenuChoice::ListSshKeys => "List SSH keys",
            MenuChoice::EvoPermissions => "Get EVO permissions",
            MenuChoice::UserInfo => "Get user info",
        }
    }
}

/// Parse a typed menu number.
pub fn parse_choice(input: &str) -> Result<MenuChoice, MenuError> {
    let trimmed = input.trim();
    let number: i64 = trimmed
        .parse()
        .map_err(|_| MenuError::NotANumber(trimmed.to_string()))?;
    usize::try_from(number)
        .ok()
        .and_then(|n| MenuChoice::ORDERED.get(n).copied())
        .ok_or(MenuError::UnknownOption(number))
}

/// The menu text, operations first and exit last.
pub fn menu_text() -> String {
    let mut text = String::from("\nChoose an operation:\n");
    for (n, choice) in MenuChoice::ORDERED.iter().enumerate().skip(1) {
        text.push_str(&format!(" {n:>2}. {}\n", choice.label()));
    }
    text.push_str(&format!("  0. {}\n", MenuChoice::Exit.label()));
    text
}

/// Ask for the API token with hidden input. Empty input yields an empty string.
pub fn prompt_token() -> Result<String> {
    let token = Password::new()
        .with_prompt("API bearer token (client ID:secret)")
        .allow_empty_password(true)
        .interact()?;
    Ok(token.trim().to_string())
}

/// Main interactive loop. Returns when the user picks 0.
pub fn main_menu(api: &ApiClient) -> Result<()> {
    loop {
        print!("{}", menu_text());
        let raw = prompt("Option number")?;
        let choice = match parse_choice(&raw) {
            Ok(choice) => choice,
            Err(e) => {
                print_error(&e);
                continue;
            }
        };
        if choice == MenuChoice::Exit {
            println!("Exiting...");
            return Ok(());
        }
        run_choice(api, choice)?;
    }
}

/// Collect input for `choice`, execute it and print the outcome.
fn run_choice(api: &ApiClient, choice: MenuChoice) -> Result<()> {
    let output = match choice {
        MenuChoice::Exit => return Ok(()),
        MenuChoice::ListInstances => {
            with_spinner("Fetching instances...", || api.list_instances())
                .map(|v| render::instances(&v))
        }
        MenuChoice::Deploy => {
            let params = DeployParams {
                product_id: prompt("Product ID")?,
                os_id: prompt("Operating system ID")?,
                time: prompt("Duration (hours)")?,
                ssh_key: prompt_optional("SSH key ID (optional, Enter to skip)")?,
                boot_script: prompt_optional("Boot script (optional, Enter to skip)")?,
            };
            with_spinner("Deploying...", || api.deploy_instance(&params))
                .map(|r| render::deploy_result(&r))
        }
        MenuChoice::Destroy => {
            let id = prompt("ID of the instance to destroy")?;
            with_spinner("Destroying...", || api.destroy_instance(&id))
                .map(|a| render::acknowledgement(&a))
        }
        MenuChoice::Power => {
            let id = prompt("Instance ID")?;
            let action = match prompt("Power action (boot, shutdown, restart, poweroff)")?
                .parse::<PowerAction>()
            {
                Ok(action) => action,
                Err(e) => {
                    print_error(&e);
                    return Ok(());
                }
            };
            with_spinner("Sending power action...", || api.power_instance(&id, action))
                .map(|a| render::acknowledgement(&a))
        }
        MenuChoice::Rebuild => {
            let params = RebuildParams {
                id: prompt("ID of the instance to rebuild")?,
                os_id: prompt("New operating system ID")?,
                ssh_key: prompt_optional("SSH key ID (optional, Enter to skip)")?,
                boot_script: prompt_optional("Boot script (optional, Enter to skip)")?,
            };
            with_spinner("Rebuilding...", || api.rebuild_instance(&params))
                .map(|r| render::rebuild_result(&r))
        }
        MenuChoice::ListPlans => {
            with_spinner("Fetching plans...", || api.list_plans()).map(|v| render::plans(&v))
        }
        MenuChoice::OsByPlan => {
            let plan_id = prompt("Plan ID")?;
            with_spinner("Fetching operating systems...", || api.os_by_plan(&plan_id))
                .map(|v| render::os_groups(&v))
        }
        MenuChoice::Renew => {
            let id = prompt("ID of the instance to renew")?;
            let hours = prompt("Renewal duration (hours)")?;
            with_spinner("Renewing...", || api.renew_instance(&id, &hours))
                .map(|r| render::renewal(&r))
        }
        MenuChoice::State => {
            let id = prompt("Instance ID")?;
            with_spinner("Fetching state...", || api.instance_state(&id))
                .map(|s| render::instance_state(&s))
        }
        MenuChoice::ListSshKeys => {
            with_spinner("Fetching SSH keys...", || api.list_ssh_keys())
                .map(|v| render::ssh_keys(&v))
        }
        MenuChoice::EvoPermissions => {
            with_spinner("Fetching permissions...", || api.evo_permissions())
                .map(|p| render::evo_permissions(&p))
        }
        MenuChoice::UserInfo => {
            with_spinner("Fetching user info...", || api.user_info())
                .map(|u| render::user_info(&u))
        }
    };

    match output {
        Ok(text) => print!("{text}"),
        Err(e) => print_client_error(&e),
    }
    Ok(())
}

/// Run `f` while a spinner is shown on the terminal.
fn with_spinner<T>(
    message: &'static str,
    f: impl FnOnce() -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

fn prompt(label: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Empty input means the field is not supplied.
fn prompt_optional(label: &str) -> Result<Option<String>> {
    let value = prompt(label)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("{} {err}", "Error:".red().bold());
}

fn print_client_error(err: &ClientError) {
    print_error(err);
    if err.is_timeout() {
        eprintln!("The request exceeded the timeout; retry or raise --timeout.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_listed_option() {
        assert_eq!(parse_choice("0"), Ok(MenuChoice::Exit));
        assert_eq!(parse_choice(" 2 "), Ok(MenuChoice::Deploy));
        assert_eq!(parse_choice("12"), Ok(MenuChoice::UserInfo));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(
            parse_choice("list"),
            Err(MenuError::NotANumber("list".into()))
        );
        assert_eq!(parse_choice(""), Err(MenuError::NotANumber(String::new())));
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert_eq!(parse_choice("13"), Err(MenuError::UnknownOption(13)));
        assert_eq!(parse_choice("-1"), Err(MenuError::UnknownOption(-1)));
    }

    #[test]
    fn menu_lists_all_operations_then_exit() {
        let text = menu_text();
        assert!(text.contains("  1. List instances\n"));
        assert!(text.contains(" 12. Get user info\n"));
        assert!(text.trim_end().ends_with("0. Exit"));
    }
}
