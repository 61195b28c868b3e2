use chrono::{NaiveDate, Utc};
use clap::Args;

use super::open_service;

#[derive(Args)]
pub struct ReportArgs {
    /// Last day of the week (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let today = args.date.unwrap_or_else(|| service.today(Utc::now()));
    let report = service.build_report(today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} (week ending {})", report.title, report.week_ending);
        println!("{}", report.body());
    }
    Ok(())
}
