use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{parse_date, truncate, CommandResult, OutputFormat};
use gains::models::{Meal, MealType};
use gains::tracker::{Applied, ChangeSet, Intent, MealInput, Tracker};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Log {
        /// Meal type (breakfast, lunch, dinner, snack or any label)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// What was eaten
        #[arg(long)]
        food: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,

        #[arg(long, default_value = "")]
        calories: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged meal
    Delete { id: String },

    /// View meal history, newest first
    History {
        /// Case-insensitive match on meal type ("all" for everything)
        #[arg(long, default_value = "all")]
        filter: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show today's meal plan and what has been logged
    Today {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MealCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            MealSubcommand::Log {
                meal_type,
                food,
                date,
                time,
                calories,
                notes,
            } => {
                let kind: MealType = meal_type.parse()?;
                let input = MealInput {
                    kind,
                    time: time.clone(),
                    date: parse_date(date.as_deref())?,
                    food: food.clone(),
                    calories: calories.clone(),
                    notes: notes.clone(),
                };
                let outcome = tracker.apply(Intent::LogMeal(input))?;
                if let Applied::Meal(meal) = &outcome.applied {
                    println!("Logged meal:");
                    print_meal_details(meal);
                }
                Ok(outcome.changes)
            }
            MealSubcommand::Delete { id } => {
                let outcome = tracker.apply(Intent::DeleteMeal { id: id.clone() })?;
                if let Applied::Meal(meal) = &outcome.applied {
                    println!("Deleted {} from {}", meal.kind, meal.date);
                }
                Ok(outcome.changes)
            }
            MealSubcommand::History { filter, format } => {
                let meals = tracker.meal_history(filter);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meal history found");
                            return Ok(ChangeSet::none());
                        }

                        let mut current_date: Option<NaiveDate> = None;
                        for meal in &meals {
                            // Print date header when it changes
                            if current_date != Some(meal.date) {
                                if current_date.is_some() {
                                    println!();
                                }
                                println!("{}", meal.date);
                                println!("{}", "-".repeat(10));
                                current_date = Some(meal.date);
                            }

                            let time = meal.time.as_deref().unwrap_or("--:--");
                            println!(
                                "  {} {:10} {:>5} kcal  {}",
                                time,
                                meal.kind.to_string(),
                                meal.calories,
                                truncate(&meal.food, 40)
                            );
                            if !meal.notes.is_empty() {
                                println!("             Notes: {}", meal.notes);
                            }
                        }

                        println!("\nTotal: {} meal(s)", meals.len());
                    }
                }
                Ok(ChangeSet::none())
            }
            MealSubcommand::Today { format } => {
                let plan = tracker.todays_meals();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                    OutputFormat::Text => {
                        if plan.is_empty() {
                            println!("No meals planned");
                        }
                        for item in &plan {
                            let mark = if item.logged { "x" } else { " " };
                            println!("[{}] {} {:10} {}", mark, item.time, item.meal.to_string(), item.food);
                            if let Some(logged) = &item.logged_meal {
                                println!("      logged: {}", logged.food);
                            }
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
        }
    }
}

fn print_meal_details(meal: &Meal) {
    println!("  Date: {}", meal.date);
    if let Some(time) = &meal.time {
        println!("  Time: {}", time);
    }
    println!("  Meal: {}", meal.kind);
    println!("  Food: {}", meal.food);
    println!("  Calories: {}", meal.calories);
    if !meal.notes.is_empty() {
        println!("  Notes: {}", meal.notes);
    }
    println!();
    println!("Meal ID: {}", meal.id);
}
