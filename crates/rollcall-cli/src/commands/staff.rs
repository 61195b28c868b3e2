use clap::Subcommand;
use rollcall_core::AdminCommand;

use super::{cli_context, ensure_saved, open_service};

#[derive(Subcommand)]
pub enum StaffAction {
    /// Add a staff member by platform user ID
    Add {
        /// User ID (or <@id> mention)
        user: String,
    },
    /// Remove a staff member (succeeds even if absent)
    Remove {
        /// User ID (or <@id> mention)
        user: String,
    },
    /// List staff in roster order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StaffAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;

    match action {
        StaffAction::Add { user } => {
            let command = AdminCommand::parse(&format!("/addstaff {user}"))
                .ok_or("could not parse user")?;
            let reply = service.handle_command(command, &cli_context())?;
            ensure_saved(&service)?;
            println!("{reply}");
        }
        StaffAction::Remove { user } => {
            let command = AdminCommand::parse(&format!("/removestaff {user}"))
                .ok_or("could not parse user")?;
            let reply = service.handle_command(command, &cli_context())?;
            ensure_saved(&service)?;
            println!("{reply}");
        }
        StaffAction::List { json } => {
            let roster = service.ledger().roster();
            if json {
                println!("{}", serde_json::to_string_pretty(roster)?);
            } else if roster.is_empty() {
                println!("No staff yet.");
            } else {
                for id in roster.iter() {
                    println!("{id}");
                }
            }
        }
    }
    Ok(())
}
