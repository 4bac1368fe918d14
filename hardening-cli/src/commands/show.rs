use clap::Args;

use hardening_core::models::{daily_totals, MENTAL_PHASES};

use super::{parse_date, OutputFormat, Session};

/// Show the tracked state
#[derive(Args)]
pub struct ShowCommand {
    /// Day to summarize (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    date: Option<String>,

    /// Output format (json prints the whole state)
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ShowCommand {
    pub fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(&state)?);
            return Ok(());
        }

        let date = parse_date(&self.date)?;
        let key = date.format("%Y-%m-%d").to_string();
        let totals = daily_totals(state.meals_on(&key));

        println!("System Hardening - {}", key);
        println!("=========================\n");

        println!("Weight: {:.1} kg", state.weight);
        if let Some(fuel) = &state.fuel_date {
            println!("Fuel date: {}", fuel);
        }
        println!();

        println!("Meals: {}", state.meals_on(&key).len());
        println!(
            "  {:.0} kcal | P {:.0}g | C {:.0}g | F {:.0}g",
            totals.cal, totals.prot, totals.carb, totals.fat
        );
        println!(
            "Water: {} cups",
            state.water_data.get(&key).copied().unwrap_or(0.0)
        );
        if let Some(hours) = state.sleep_data.get(&key) {
            println!("Sleep: {} hours", hours);
        }
        println!();

        let tasks = state.tasks_on(&key);
        if tasks.is_empty() {
            println!("Exercises done: none");
        } else {
            println!("Exercises done: {}", tasks.join(", "));
        }
        println!("Streak: {} days", state.streak.current(date));
        println!(
            "Mental phases: {}/{}",
            state.mental_progress.completed_phases.len(),
            MENTAL_PHASES
        );

        let current = &state.body_measurements.current;
        if current.has_measurement() {
            let show = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{}", v));
            println!(
                "Measurements: chest {} | arm {} | waist {} | leg {}",
                show(current.chest),
                show(current.arm),
                show(current.waist),
                show(current.leg)
            );
        }
        println!();

        match &state.last_backup {
            Some(last) => println!("Last backup: {}", last),
            None => println!("Last backup: never"),
        }
        Ok(())
    }
}
