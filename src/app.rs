//! Command-line front end.
//!
//! One subcommand per screen of the web client. Every command loads the
//! configuration, restores the stored session when it needs one, and prints
//! plain text.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tokio::sync::{broadcast, mpsc};

use fitex::api::{
    Anamnesis, ApiClient, ExerciseFilter, GeneratePlanRequest, NewTrainingPlan, TrainingPlan,
    UserProfile, WorkoutExercise,
};
use fitex::auth::{AuthSession, FileStore, KeyValueStore, KeyringStore};
use fitex::catalog::{
    body_mass_index, BmiClass, Category, Difficulty, ExperienceLevel, Gender, Goal, Joint,
};
use fitex::storage::config::{self, AppConfig, Language, TokenBackend};
use fitex::workouts::{
    display_name, RunOutcome, SessionCommand, SessionEvent, SessionLoader, SessionRunner,
    SetOutcome,
};

/// Days shown in the weekly activity chart.
const CHART_DAYS: usize = 7;
const CHART_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "fitex")]
#[command(about = "Fitness tracking client for the Fitex backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "FITEX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "FITEX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user with profile and anamnesis
    Whoami,

    /// Browse the exercise catalog
    Exercises(ExerciseArgs),

    /// Show one exercise with instructions
    Exercise {
        /// Exercise id
        id: String,
    },

    /// List categories, muscle groups and difficulty levels
    Categories,

    /// Manage training plans
    #[command(subcommand)]
    Plans(PlanCommands),

    /// Run a guided workout
    Workout {
        /// Plan to train; a quick workout is sampled when omitted
        #[arg(long)]
        plan: Option<String>,
    },

    /// List logged workouts
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long)]
        skip: Option<u32>,
    },

    /// Show workout statistics
    Stats,

    /// Show the logged history of one exercise
    Progress {
        /// Exercise id
        exercise_id: String,
    },

    /// Update body data and training preferences
    Profile(ProfileArgs),

    /// Update the health questionnaire
    Anamnesis(AnamnesisArgs),

    /// Check that the backend is reachable
    Health,

    /// Show the configuration file location and contents
    Config,
}

#[derive(Args)]
struct ExerciseArgs {
    /// strength, cardio, flexibility, bodyweight, rehabilitation
    #[arg(long)]
    category: Option<Category>,

    /// beginner, intermediate, advanced
    #[arg(long)]
    difficulty: Option<Difficulty>,

    #[arg(long)]
    muscle_group: Option<String>,

    /// Only rehabilitation exercises
    #[arg(long)]
    rehab: bool,

    /// Case-insensitive name filter
    #[arg(long)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum PlanCommands {
    /// List your plans
    List,

    /// Show a plan with its exercises
    Show { id: String },

    /// Create a plan
    Create {
        #[arg(long)]
        name: String,

        /// weight_loss, muscle_gain, mobility, endurance, rehabilitation
        #[arg(long)]
        goal: Goal,

        /// Exercise as ID or ID:SETSxREPS, repeatable
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value_t = 3)]
        days: u32,

        #[arg(long, default_value_t = 4)]
        weeks: u32,
    },

    /// Generate a plan from your profile
    Generate {
        #[arg(long)]
        goal: Goal,

        #[arg(long, default_value_t = 3)]
        days: u32,

        #[arg(long, default_value_t = 4)]
        weeks: u32,
    },

    /// Delete a plan
    Delete { id: String },
}

#[derive(Args)]
struct ProfileArgs {
    /// Weight in kg
    #[arg(long)]
    weight: Option<f32>,

    /// Height in cm
    #[arg(long)]
    height: Option<f32>,

    #[arg(long)]
    age: Option<u32>,

    /// male, female, other
    #[arg(long)]
    gender: Option<Gender>,

    #[arg(long)]
    goal: Option<Goal>,

    /// beginner, intermediate, advanced
    #[arg(long)]
    level: Option<ExperienceLevel>,
}

#[derive(Args)]
struct AnamnesisArgs {
    #[arg(long)]
    heart_conditions: bool,

    #[arg(long)]
    high_blood_pressure: bool,

    #[arg(long)]
    diabetes: bool,

    /// knee, hip, shoulder, back, ankle; repeatable
    #[arg(long = "joint")]
    joints: Vec<Joint>,

    #[arg(long)]
    other: Option<String>,

    #[arg(long)]
    medications: Option<String>,

    #[arg(long)]
    limitations: Option<String>,
}

type Session = AuthSession<Box<dyn KeyValueStore>>;

/// Configuration and session shared by the commands.
struct App {
    config: AppConfig,
    session: Session,
}

impl App {
    fn new() -> Result<Self> {
        let config = config::load_config().context("Failed to load configuration")?;
        let client = ApiClient::new(&config.api).context("Invalid API settings")?;
        let session = AuthSession::new(client, open_store(&config));
        Ok(Self { config, session })
    }

    fn client(&self) -> &ApiClient {
        self.session.client()
    }

    fn language(&self) -> Language {
        self.config.display.language
    }

    /// Restore the stored session and require a signed-in user.
    async fn require_login(&mut self) -> Result<()> {
        self.session.restore().await;
        if !self.session.is_authenticated() {
            bail!("Not signed in. Run `fitex login` first.");
        }
        Ok(())
    }
}

fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    if config.auth.backend == TokenBackend::Keyring {
        match KeyringStore::new() {
            Ok(store) => return Box::new(store),
            Err(e) => tracing::warn!("{}, storing the session in a file instead", e),
        }
    }
    Box::new(FileStore::in_dir(&config.data_dir))
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let mut app = App::new()?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = app.session.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Commands::Register {
            email,
            name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = app.session.register(&email, &password, &name).await?;
            println!("Account created. Signed in as {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            app.session.logout()?;
            println!("Signed out");
        }
        Commands::Whoami => {
            app.require_login().await?;
            print_user(&app.session);
        }
        Commands::Exercises(args) => list_exercises(&app, args).await?,
        Commands::Exercise { id } => show_exercise(&app, &id).await?,
        Commands::Categories => {
            let catalog = app.client().get_categories().await?;
            println!("Categories:");
            for category in &catalog.categories {
                println!("  {:<16} {}", category.id, category.name);
            }
            println!("Difficulty levels:");
            for level in &catalog.difficulty_levels {
                println!("  {:<16} {}", level.id, level.name);
            }
            println!("Muscle groups: {}", catalog.muscle_groups.join(", "));
        }
        Commands::Plans(command) => plans(&mut app, command).await?,
        Commands::Workout { plan } => workout(&mut app, plan.as_deref()).await?,
        Commands::History { limit, skip } => {
            app.require_login().await?;
            let logs = app.client().list_workouts(Some(limit), skip).await?;
            if logs.is_empty() {
                println!("No workouts logged yet");
            }
            for log in &logs {
                let sets: u32 = log.exercises.iter().map(|ex| ex.sets_completed).sum();
                println!(
                    "{}  {:>3} min  {} exercises, {} sets",
                    log.date,
                    log.duration_minutes,
                    log.exercises.len(),
                    sets
                );
            }
        }
        Commands::Stats => {
            app.require_login().await?;
            let stats = app.client().get_workout_stats().await?;
            println!("Workouts:       {}", stats.total_workouts);
            println!("Total minutes:  {}", stats.total_duration_minutes);
            println!("This week:      {}", stats.workouts_this_week);
            println!("This month:     {}", stats.workouts_this_month);
            println!("Streak:         {} days", stats.streak_days);
            let max = stats.max_duration(CHART_DAYS);
            for day in stats.last_days(CHART_DAYS) {
                let width = (day.duration as usize * CHART_WIDTH) / max as usize;
                println!("  {}  {:<w$} {} min", day.date, "#".repeat(width), day.duration, w = CHART_WIDTH);
            }
        }
        Commands::Progress { exercise_id } => {
            app.require_login().await?;
            let entries = app.client().get_exercise_progress(&exercise_id).await?;
            if entries.is_empty() {
                println!("No history for {}", exercise_id);
            }
            for entry in &entries {
                println!(
                    "{}  {} sets  {} reps  {}",
                    entry.date.as_deref().unwrap_or("-"),
                    entry.sets.map_or("-".to_string(), |s| s.to_string()),
                    entry.reps.map_or("-".to_string(), |r| r.to_string()),
                    entry
                        .weight
                        .map_or("-".to_string(), |w| format!("{w} kg"))
                );
            }
        }
        Commands::Profile(args) => update_profile(&mut app, args).await?,
        Commands::Anamnesis(args) => {
            app.require_login().await?;
            let anamnesis = Anamnesis {
                heart_conditions: args.heart_conditions,
                high_blood_pressure: args.high_blood_pressure,
                diabetes: args.diabetes,
                joint_problems: args.joints,
                other_conditions: args.other,
                medications: args.medications,
                physical_limitations: args.limitations,
            };
            app.session.update_anamnesis(&anamnesis).await?;
            println!("Anamnesis saved");
        }
        Commands::Health => {
            let status = app.client().health_check().await?;
            println!(
                "{}: {}{}",
                app.client().base_url(),
                status.status,
                status
                    .timestamp
                    .map(|ts| format!(" ({ts})"))
                    .unwrap_or_default()
            );
        }
        Commands::Config => {
            println!("# {}", config::get_config_path().display());
            let rendered = toml::to_string_pretty(&app.config)
                .context("Failed to render configuration")?;
            print!("{rendered}");
        }
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

fn print_user(session: &Session) {
    let Some(user) = session.user() else {
        return;
    };
    println!("{} <{}>", user.name, user.email);

    if let Some(profile) = &user.profile {
        if let Some(goal) = profile.fitness_goal {
            println!("Goal:        {} ({})", goal, goal.description());
        }
        if let Some(level) = profile.experience_level {
            println!("Level:       {}", level);
        }
        if let (Some(weight), Some(height)) = (profile.weight, profile.height) {
            println!("Body:        {} kg, {} cm", weight, height);
        }
        let bmi = profile.bmi.or_else(|| {
            profile
                .weight
                .zip(profile.height)
                .and_then(|(w, h)| body_mass_index(w, h))
        });
        if let Some(bmi) = bmi {
            println!("BMI:         {:.1} ({})", bmi, BmiClass::from_bmi(bmi));
        }
    }

    match &user.anamnesis {
        Some(anamnesis) if anamnesis.has_findings() => {
            let mut findings = Vec::new();
            if anamnesis.heart_conditions {
                findings.push("heart conditions".to_string());
            }
            if anamnesis.high_blood_pressure {
                findings.push("high blood pressure".to_string());
            }
            if anamnesis.diabetes {
                findings.push("diabetes".to_string());
            }
            findings.extend(anamnesis.joint_problems.iter().map(|j| j.label().to_string()));
            findings.extend(anamnesis.other_conditions.iter().cloned());
            println!("Anamnesis:   {}", findings.join(", "));
        }
        Some(_) => println!("Anamnesis:   no findings"),
        None => println!("Anamnesis:   not filled in"),
    }
}

async fn list_exercises(app: &App, args: ExerciseArgs) -> Result<()> {
    let filter = ExerciseFilter {
        category: args.category,
        muscle_group: args.muscle_group,
        difficulty: args.difficulty,
        is_rehabilitation: args.rehab.then_some(true),
    };
    let exercises = app.client().list_exercises(&filter).await?;
    let needle = args.search.map(|s| s.to_lowercase());

    let mut shown = 0;
    for exercise in &exercises {
        let name = display_name(exercise, app.language());
        if let Some(needle) = &needle {
            if !name.to_lowercase().contains(needle) && !exercise.name.to_lowercase().contains(needle)
            {
                continue;
            }
        }
        println!(
            "{:<26} {:<32} {:<20} {}",
            exercise.id, name, exercise.category, exercise.difficulty
        );
        shown += 1;
    }
    println!("{} exercises", shown);
    Ok(())
}

async fn show_exercise(app: &App, id: &str) -> Result<()> {
    let exercise = app.client().get_exercise(id).await?;
    let german = app.language() == Language::German;

    println!("{}", display_name(&exercise, app.language()));
    println!("Category:    {}", exercise.category);
    println!("Difficulty:  {}", exercise.difficulty);
    if !exercise.muscle_groups.is_empty() {
        println!("Muscles:     {}", exercise.muscle_groups.join(", "));
    }
    if let Some(equipment) = &exercise.equipment {
        println!("Equipment:   {}", equipment);
    }
    if let Some(kcal) = exercise.calories_per_minute {
        println!("Calories:    {} kcal/min", kcal);
    }

    let description = if german && !exercise.description_de.is_empty() {
        &exercise.description_de
    } else {
        &exercise.description
    };
    if !description.is_empty() {
        println!("\n{}", description);
    }

    let instructions = if german && !exercise.instructions_de.is_empty() {
        &exercise.instructions_de
    } else {
        &exercise.instructions
    };
    for (i, step) in instructions.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    if !exercise.contraindications.is_empty() {
        println!("\nNot recommended with: {}", exercise.contraindications.join(", "));
    }
    Ok(())
}

async fn plans(app: &mut App, command: PlanCommands) -> Result<()> {
    app.require_login().await?;

    match command {
        PlanCommands::List => {
            let plans = app.client().list_plans().await?;
            if plans.is_empty() {
                println!("No plans yet");
            }
            for plan in &plans {
                println!(
                    "{:<26} {:<30} {:<18} {} exercises{}",
                    plan.id,
                    plan.name,
                    plan.goal,
                    plan.exercises.len(),
                    if plan.is_ai_generated { " (generated)" } else { "" }
                );
            }
        }
        PlanCommands::Show { id } => {
            let plan = app.client().get_plan(&id).await?;
            print_plan(&plan);
        }
        PlanCommands::Create {
            name,
            goal,
            exercises,
            description,
            days,
            weeks,
        } => {
            let exercises = exercises
                .iter()
                .map(|arg| parse_prescription(arg))
                .collect::<Result<Vec<_>>>()?;
            let mut draft = NewTrainingPlan::new(name, goal, exercises);
            draft.description = description;
            draft.days_per_week = days;
            draft.duration_weeks = weeks;

            let plan = app.client().create_plan(&draft).await?;
            println!("Created plan {}", plan.id);
        }
        PlanCommands::Generate { goal, days, weeks } => {
            let mut request = GeneratePlanRequest::new(goal);
            request.days_per_week = days;
            request.duration_weeks = weeks;

            let plan = app.client().generate_plan(&request).await?;
            print_plan(&plan);
        }
        PlanCommands::Delete { id } => {
            app.client().delete_plan(&id).await?;
            println!("Deleted plan {}", id);
        }
    }
    Ok(())
}

fn print_plan(plan: &TrainingPlan) {
    println!("{} [{}]", plan.name, plan.id);
    println!(
        "Goal: {}  |  {} days/week for {} weeks",
        plan.goal, plan.days_per_week, plan.duration_weeks
    );
    if let Some(description) = &plan.description {
        println!("{}", description);
    }
    for (i, ex) in plan.exercises.iter().enumerate() {
        let volume = match (ex.reps, ex.duration_seconds) {
            (Some(reps), _) => format!("{} x {}", ex.sets, reps),
            (None, Some(seconds)) => format!("{} x {} s", ex.sets, seconds),
            (None, None) => format!("{} sets", ex.sets),
        };
        println!(
            "  {}. {:<26} {:<10} rest {} s{}",
            i + 1,
            ex.exercise_id,
            volume,
            ex.rest_seconds,
            ex.weight_kg.map(|w| format!(", {w} kg")).unwrap_or_default()
        );
    }
}

/// Parse `ID` or `ID:SETSxREPS` into a prescription.
fn parse_prescription(arg: &str) -> Result<WorkoutExercise> {
    let (id, volume) = match arg.split_once(':') {
        Some((id, volume)) => (id, Some(volume)),
        None => (arg, None),
    };
    if id.trim().is_empty() {
        bail!("Missing exercise id in '{}'", arg);
    }

    let mut exercise = WorkoutExercise::new(id.trim());
    if let Some(volume) = volume {
        let (sets, reps) = volume
            .split_once(['x', 'X'])
            .with_context(|| format!("Expected SETSxREPS in '{}'", arg))?;
        exercise.sets = sets
            .trim()
            .parse()
            .with_context(|| format!("Invalid set count in '{}'", arg))?;
        exercise.reps = Some(
            reps.trim()
                .parse()
                .with_context(|| format!("Invalid rep count in '{}'", arg))?,
        );
    }
    Ok(exercise)
}

async fn update_profile(app: &mut App, args: ProfileArgs) -> Result<()> {
    app.require_login().await?;

    let mut profile: UserProfile = app
        .session
        .user()
        .and_then(|user| user.profile.clone())
        .unwrap_or_default();
    if args.weight.is_some() {
        profile.weight = args.weight;
    }
    if args.height.is_some() {
        profile.height = args.height;
    }
    if args.age.is_some() {
        profile.age = args.age;
    }
    if args.gender.is_some() {
        profile.gender = args.gender;
    }
    if args.goal.is_some() {
        profile.fitness_goal = args.goal;
    }
    if args.level.is_some() {
        profile.experience_level = args.level;
    }
    profile.bmi = None;

    let user = app.session.update_profile(&profile).await?;
    let bmi = user.profile.as_ref().and_then(|p| p.bmi);
    match bmi {
        Some(bmi) => println!("Profile saved. BMI {:.1} ({})", bmi, BmiClass::from_bmi(bmi)),
        None => println!("Profile saved"),
    }
    Ok(())
}

async fn workout(app: &mut App, plan_id: Option<&str>) -> Result<()> {
    app.require_login().await?;

    let client = app.client();
    let loader = SessionLoader::new(client, &app.config.workout, app.language());
    let loaded = loader
        .load(plan_id, Utc::now())
        .await
        .context("Could not start workout")?;

    for missing in &loaded.unresolved {
        println!("Note: exercise {} could not be loaded", missing.exercise_id);
    }

    let names: Vec<String> = loaded
        .session
        .exercises()
        .iter()
        .map(|ex| ex.name.clone())
        .collect();
    println!("Workout with {} exercises:", names.len());
    for (i, ex) in loaded.session.exercises().iter().enumerate() {
        println!(
            "  {}. {} ({} x {})",
            i + 1,
            ex.name,
            ex.sets,
            ex.reps.map_or("-".to_string(), |r| r.to_string())
        );
    }
    println!("[Enter] set done  [s] skip rest  [1-9] select exercise  [f] finish  [q] quit");

    let (runner, events) = SessionRunner::new(loaded.session, client);
    let (tx, rx) = mpsc::channel(16);
    spawn_input_reader(tx);

    let (outcome, ()) = tokio::join!(runner.run(rx), print_events(events, names));

    match outcome {
        RunOutcome::Submitted(log) => {
            println!("Workout saved: {} min on {}", log.duration_minutes, log.date);
        }
        RunOutcome::Abandoned(session) | RunOutcome::Disconnected(session) => {
            let progress = session.progress();
            println!(
                "Workout not saved ({}/{} sets done)",
                progress.completed_sets, progress.total_sets
            );
        }
    }
    Ok(())
}

/// Forward stdin lines as session commands from a dedicated thread.
fn spawn_input_reader(tx: mpsc::Sender<SessionCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "" | "d" => SessionCommand::CompleteSet,
                "s" => SessionCommand::SkipRest,
                "f" => SessionCommand::Finish,
                "q" => SessionCommand::Abandon,
                other => match other.parse::<usize>() {
                    Ok(n) if n >= 1 => SessionCommand::Select(n - 1),
                    _ => {
                        println!("Unknown input '{}'", other);
                        continue;
                    }
                },
            };
            if tx.blocking_send(command).is_err() {
                break;
            }
        }
    });
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>, names: Vec<String>) {
    let name = |index: usize| names.get(index).map(String::as_str).unwrap_or("?");

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} session events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event {
            SessionEvent::SetCompleted {
                exercise_index,
                outcome,
            } => match outcome {
                SetOutcome::Resting { seconds } => {
                    println!("Set done ({}). Rest {} s", name(exercise_index), seconds)
                }
                SetOutcome::NextSet => println!("Set done ({}). Next set", name(exercise_index)),
                SetOutcome::Advanced { index } => {
                    println!("{} complete. Next: {}", name(exercise_index), name(index))
                }
                SetOutcome::ExerciseDone => println!(
                    "{} complete. Select an open exercise or quit",
                    name(exercise_index)
                ),
                SetOutcome::SessionComplete => {
                    println!("All sets done. Press [f] to save the workout")
                }
            },
            SessionEvent::RestTick { remaining } => {
                print!("\rRest {:>3} s ", remaining);
                let _ = std::io::stdout().flush();
            }
            SessionEvent::RestFinished => println!("\r\x07Rest over. Next set"),
            SessionEvent::RestSkipped => println!("Rest skipped"),
            SessionEvent::ExerciseSelected { index } => println!("Now: {}", name(index)),
            SessionEvent::CommandRejected { reason } => println!("{}", reason),
            SessionEvent::Submitted { .. } => {}
            SessionEvent::SubmitFailed { message } => {
                println!("{}. Press [f] to retry or [q] to quit", message)
            }
            SessionEvent::Abandoned => {}
        }
    }
}
