use clap::{Args, Subcommand};

use hardening_core::models::{daily_totals, FoodValues, MealEntry};
use hardening_core::state::actions;

use super::{parse_date, OutputFormat, Session};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Add {
        /// Meal name
        name: String,

        /// Calories (kcal)
        #[arg(long, default_value_t = 0.0)]
        cal: f64,

        /// Protein (g)
        #[arg(long, default_value_t = 0.0)]
        prot: f64,

        /// Carbohydrates (g)
        #[arg(long, default_value_t = 0.0)]
        carb: f64,

        /// Fat (g)
        #[arg(long, default_value_t = 0.0)]
        fat: f64,

        /// Amount eaten, in `unit`
        #[arg(long)]
        amount: Option<f64>,

        /// Unit of the amount (g, piece, custom)
        #[arg(long, default_value = "custom")]
        unit: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Delete a logged meal by its position in `meal list`
    Delete {
        /// 1-based position
        index: usize,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List meals for a day
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MealCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Add {
                name,
                cal,
                prot,
                carb,
                fat,
                amount,
                unit,
                date,
            } => {
                let date = parse_date(date)?;
                let values = FoodValues {
                    cal: *cal,
                    prot: *prot,
                    carb: *carb,
                    fat: *fat,
                };
                let mut meal = MealEntry::new(name.trim(), values);
                if let Some(amount) = amount {
                    meal = meal.with_amount(*amount, unit.as_str());
                }

                session.dispatch(actions::add_meal(meal.clone(), date))?;
                session.save().await?;

                println!("Logged {} for {}", meal, date);
                Ok(())
            }

            MealSubcommand::Delete { index, date } => {
                let date = parse_date(date)?;
                let key = date.format("%Y-%m-%d").to_string();
                let count = session.state().meals_on(&key).len();
                if *index == 0 || *index > count {
                    return Err(format!("No meal #{} on {} ({} logged)", index, key, count).into());
                }

                session.dispatch(actions::delete_meal(index - 1, date))?;
                session.save().await?;

                println!("Deleted meal #{} on {}", index, key);
                Ok(())
            }

            MealSubcommand::List { date, format } => {
                let date = parse_date(date)?;
                let key = date.format("%Y-%m-%d").to_string();
                let state = session.state();
                let meals = state.meals_on(&key);
                let totals = daily_totals(meals);

                match format {
                    OutputFormat::Json => {
                        let output = serde_json::json!({
                            "date": key,
                            "meals": meals,
                            "totals": totals,
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meals logged on {}.", key);
                            return Ok(());
                        }
                        println!("Meals on {}", key);
                        println!();
                        for (i, meal) in meals.iter().enumerate() {
                            println!("  {}. {}", i + 1, meal);
                        }
                        println!();
                        println!(
                            "Total: {:.0} kcal, {:.1}g protein, {:.1}g carbs, {:.1}g fat",
                            totals.cal, totals.prot, totals.carb, totals.fat
                        );
                    }
                }
                Ok(())
            }
        }
    }
}
