use clap::{Args, Subcommand};

use hardening_core::models::{personal_best, ExerciseHistoryEntry, MENTAL_PHASES};
use hardening_core::state::{actions, ActionKind};

use super::{parse_date, Session};

#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Mark an exercise done for a day, or undo it
    Toggle {
        /// Exercise id
        task_id: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl TaskCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TaskSubcommand::Toggle { task_id, date } => {
                let date = parse_date(date)?;
                let key = date.format("%Y-%m-%d").to_string();
                session.dispatch(actions::toggle_task(task_id.as_str(), date))?;

                let state = session.state();
                let done = state.tasks_on(&key).iter().any(|t| t == task_id);
                if done {
                    let streak = state.streak.advance(date);
                    if streak != state.streak {
                        session.dispatch(actions::update_streak(streak.count, Some(date)))?;
                    }
                }
                session.save().await?;

                if done {
                    let streak = session.state().streak.count;
                    println!("Done: {} on {} (streak {})", task_id, key, streak);
                } else {
                    println!("Not done: {} on {}", task_id, key);
                }
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct SetCommand {
    #[command(subcommand)]
    pub command: SetSubcommand,
}

#[derive(Subcommand)]
pub enum SetSubcommand {
    /// Log a completed set
    Log {
        /// Exercise id
        task_id: String,

        /// 1-based set number
        set: usize,

        /// Repetitions
        #[arg(long, short)]
        reps: f64,

        /// Load in kg (0 for bodyweight)
        #[arg(long, short, default_value_t = 0.0)]
        weight: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl SetCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SetSubcommand::Log {
                task_id,
                set,
                reps,
                weight,
                date,
            } => {
                if *set == 0 {
                    return Err("Set numbers start at 1".into());
                }
                let date = parse_date(date)?;
                let action = actions::log_set(task_id.as_str(), set - 1, *weight, *reps, date);
                let ActionKind::LogSet { timestamp, .. } = &action.kind else {
                    return Err("log_set produced an unexpected action".into());
                };
                let entry = ExerciseHistoryEntry::new(
                    *weight,
                    *reps,
                    date.format("%Y-%m-%d").to_string(),
                    timestamp.as_str(),
                );

                session.dispatch(action)?;
                session.dispatch(actions::save_exercise_history(task_id.as_str(), entry))?;
                session.save().await?;

                println!("Logged set {} of {}: {} x {} kg", set, task_id, reps, weight);
                let state = session.state();
                if let Some(best) = state
                    .exercise_history
                    .get(task_id)
                    .and_then(|history| personal_best(history))
                {
                    println!(
                        "Best volume: {:.0} ({} x {} kg)",
                        best.volume.unwrap_or(0.0),
                        best.reps.unwrap_or(0.0),
                        best.weight.unwrap_or(0.0)
                    );
                }
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct PhaseCommand {
    #[command(subcommand)]
    pub command: PhaseSubcommand,
}

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// Mark a mental phase complete
    Complete {
        /// Phase number
        phase: u8,
    },
}

impl PhaseCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PhaseSubcommand::Complete { phase } => {
                session.dispatch(actions::complete_mental_phase(*phase))?;
                session.save().await?;

                let progress = session.state().mental_progress;
                println!(
                    "Phase {} complete ({}/{} phases)",
                    phase,
                    progress.completed_phases.len(),
                    MENTAL_PHASES
                );
                Ok(())
            }
        }
    }
}
