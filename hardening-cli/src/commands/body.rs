use clap::{Args, Subcommand};

use hardening_core::state::actions;

use super::{parse_date, Session};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record body weight and add it to the history
    Set {
        /// Weight in kg
        kg: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl WeightCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Set { kg, date } => {
                let date = parse_date(date)?;
                session.dispatch(actions::save_weight(*kg, date))?;
                session.save().await?;
                println!("Weight set to {:.1} kg on {}", kg, date);
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct WaterCommand {
    #[command(subcommand)]
    pub command: WaterSubcommand,
}

#[derive(Subcommand)]
pub enum WaterSubcommand {
    /// Add cups of water to a day's total
    Add {
        /// Cups to add
        #[arg(default_value_t = 1.0)]
        cups: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl WaterCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WaterSubcommand::Add { cups, date } => {
                let date = parse_date(date)?;
                session.dispatch(actions::add_water(*cups, date))?;
                session.save().await?;

                let key = date.format("%Y-%m-%d").to_string();
                let total = session.state().water_data.get(&key).copied().unwrap_or(0.0);
                println!("Water on {}: {} cups", key, total);
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct SleepCommand {
    #[command(subcommand)]
    pub command: SleepSubcommand,
}

#[derive(Subcommand)]
pub enum SleepSubcommand {
    /// Record hours slept
    Set {
        /// Hours slept
        hours: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl SleepCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SleepSubcommand::Set { hours, date } => {
                let date = parse_date(date)?;
                session.dispatch(actions::set_sleep(*hours, date))?;
                session.save().await?;
                println!("Sleep on {}: {} hours", date, hours);
                Ok(())
            }
        }
    }
}
