mod backup_cmd;
mod body;
mod config_cmd;
mod meal;
mod session;
mod show;
mod workout;

use chrono::NaiveDate;
use clap::ValueEnum;

pub use backup_cmd::{ExportCommand, ImportCommand, StatusCommand};
pub use body::{SleepCommand, WaterCommand, WeightCommand};
pub use config_cmd::ConfigCommand;
pub use meal::MealCommand;
pub use session::Session;
pub use show::ShowCommand;
pub use workout::{PhaseCommand, SetCommand, TaskCommand};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses an optional `--date`, defaulting to today.
pub fn parse_date(date: &Option<String>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d)),
        None => Ok(hardening_core::state::actions::today()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(&Some("2024-01-15".to_string())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date(&Some("15/01/2024".to_string()))
            .unwrap_err()
            .contains("YYYY-MM-DD"));
        assert_eq!(
            parse_date(&None).unwrap(),
            hardening_core::state::actions::today()
        );
    }
}
