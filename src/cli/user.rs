//! User account CLI commands
//!
//! Passwords are never taken as arguments. They are prompted for on the
//! terminal, or read from stdin with `--password-stdin` for scripting.

use std::io::BufRead;

use clap::Subcommand;

use crate::auth::ClearPassword;
use crate::display::{format_user_details, format_user_list};
use crate::error::{BizdeskError, BizdeskResult};
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a back-office user
    Add {
        name: String,
        email: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// List users
    List,
    /// Show user details
    Show {
        /// Email or ID
        user: String,
    },
    /// Change a user's password
    Passwd {
        /// Email or ID
        user: String,
        /// Read the current and new password from two lines of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Enable two-factor authentication and print the recovery codes
    EnableTwoFactor {
        /// Email or ID
        user: String,
    },
    /// Disable two-factor authentication
    DisableTwoFactor {
        /// Email or ID
        user: String,
    },
    /// Soft-delete a user
    Delete {
        /// Email or ID
        user: String,
    },
    /// Restore a deleted user
    Restore {
        /// Email or ID
        user: String,
    },
}

/// Handle a user command
pub fn handle_user_command(storage: &Storage, cmd: UserCommands) -> BizdeskResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add {
            name,
            email,
            admin,
            password_stdin,
        } => {
            let password = if password_stdin {
                let mut lines = read_stdin_lines(1)?;
                ClearPassword::new(lines.remove(0))
            } else {
                prompt_new_password()?
            };
            password.validate()?;

            let user = service.register(&name, &email, &password, admin)?;
            println!("Created user: {} <{}>", user.name, user.email);
            println!("  ID: {}", user.id);
        }

        UserCommands::List => {
            let users = service.list()?;
            print!("{}", format_user_list(&users));
        }

        UserCommands::Show { user } => {
            let found = service.find(&user)?;
            print!("{}", format_user_details(&found));
        }

        UserCommands::Passwd {
            user,
            password_stdin,
        } => {
            let (current, new) = if password_stdin {
                let mut lines = read_stdin_lines(2)?;
                let new = ClearPassword::new(lines.remove(1));
                (ClearPassword::new(lines.remove(0)), new)
            } else {
                (prompt_password("Current password: ")?, prompt_new_password()?)
            };
            new.validate()?;

            let updated = service.change_password(&user, &current, &new)?;
            println!("Password changed for {}", updated.email);
        }

        UserCommands::EnableTwoFactor { user } => {
            let (updated, codes) = service.enable_two_factor(&user)?;
            println!("Two-factor authentication enabled for {}", updated.email);
            println!("Store these recovery codes somewhere safe; they are shown once:");
            for code in codes {
                println!("  {}", code);
            }
        }

        UserCommands::DisableTwoFactor { user } => {
            let updated = service.disable_two_factor(&user)?;
            println!("Two-factor authentication disabled for {}", updated.email);
        }

        UserCommands::Delete { user } => {
            let deleted = service.delete(&user)?;
            println!("Deleted user: {}", deleted.email);
        }

        UserCommands::Restore { user } => {
            let restored = service.restore(&user)?;
            println!("Restored user: {}", restored.email);
        }
    }

    Ok(())
}

/// Prompt for a new password with confirmation
fn prompt_new_password() -> BizdeskResult<ClearPassword> {
    loop {
        let first = prompt_password("New password: ")?;
        if let Err(e) = first.validate() {
            println!("{}. Please try again.", e);
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first.as_str() != second.as_str() {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> BizdeskResult<ClearPassword> {
    rpassword::prompt_password(prompt)
        .map(ClearPassword::new)
        .map_err(|e| BizdeskError::Auth(format!("Failed to read password: {}", e)))
}

fn read_stdin_lines(count: usize) -> BizdeskResult<Vec<String>> {
    let stdin = std::io::stdin();
    let lines: Vec<String> = stdin
        .lock()
        .lines()
        .take(count)
        .collect::<Result<_, _>>()?;

    if lines.len() < count {
        return Err(BizdeskError::Validation(format!(
            "Expected {} line(s) on stdin, got {}",
            count,
            lines.len()
        )));
    }
    Ok(lines)
}
