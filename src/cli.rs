//! The interactive session: a line-based shell over the core.
//!
//! This layer is presentation only. Validation, coercion and aggregation all
//! live in `core` and `db`; the shell parses arguments, refuses guest writes,
//! and renders results and classified errors as messages. Network commands
//! run on a spawned task and the loop awaits the single result handoff, so
//! the session stays responsive without sharing any mutable state with the
//! call.

use crate::api::{ApiError, ChatClient, LookupOutcome, RecipeClient};
use crate::config::AppConfig;
use crate::core::{analytics, health};
use crate::db::{self, DbPool, MealFields};
use crate::errors::{Error, Result};
use crate::models::{DailyTotals, MealLogEntry, Profile, RecipeHit, User};
use crate::settings::{Settings, Theme};
use chrono::{Local, NaiveDate};
use std::io::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};

pub struct AppContext {
    pool: DbPool,
    settings_path: PathBuf,
    settings: Settings,
    recipes: RecipeClient,
    chat: ChatClient,
    user: User,
    /// Candidates from the last successful lookup, kept for `accept <n>`.
    pending_hits: Vec<RecipeHit>,
}

impl AppContext {
    #[must_use]
    pub fn new(pool: DbPool, config: &AppConfig, settings_path: PathBuf) -> Self {
        let settings = Settings::load(&settings_path);
        let recipes = RecipeClient::new(&settings.spoonacular_api_key, config.http_timeout());
        let chat = ChatClient::new(
            Some(settings.groq_api_key.as_str()),
            &config.chat_model,
            config.http_timeout(),
        );
        Self {
            pool,
            settings_path,
            settings,
            recipes,
            chat,
            user: User::guest(),
            pending_hits: Vec::new(),
        }
    }
}

/// Runs the interactive loop until `quit` or end of input.
#[instrument(skip(ctx))]
pub async fn run(mut ctx: AppContext) -> Result<()> {
    println!("SmartPlate — type 'help' for commands. You are browsing as {}.", ctx.user.name);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("smartplate> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            continue;
        };

        let done = match dispatch(&mut ctx, command, args).await {
            Ok(done) => done,
            Err(e) => {
                println!("Error: {e}");
                false
            }
        };
        if done {
            break;
        }
    }
    info!("Session ended");
    Ok(())
}

/// Routes one command line. Returns `Ok(true)` when the session should end.
async fn dispatch(ctx: &mut AppContext, command: &str, args: &[&str]) -> Result<bool> {
    match command {
        "help" => print_help(),
        "signup" => signup(ctx, args).await?,
        "login" => login(ctx, args).await?,
        "guest" | "logout" => {
            ctx.user = User::guest();
            println!("Browsing as Guest. Nothing will be saved.");
        }
        "whoami" => println!("{} (id {})", ctx.user.name, ctx.user.id),
        "profile" => profile(ctx, args).await?,
        "log" => log_meal(ctx, args).await?,
        "meals" => list_meals(ctx, args).await?,
        "edit" => edit_meal(ctx, args).await?,
        "delete" => delete_meal(ctx, args).await?,
        "today" => today(ctx).await?,
        "lookup" => lookup(ctx, args).await?,
        "accept" => accept(ctx, args).await?,
        "ask" => ask(ctx, args).await?,
        "theme" => theme(ctx, args)?,
        "key" => set_key(ctx, args)?,
        "quit" | "exit" => return Ok(true),
        other => println!("Unknown command '{other}'. Type 'help'."),
    }
    Ok(false)
}

fn print_help() {
    println!(
        "Commands:\n\
         \x20 signup <email> <password> [name]     create an account\n\
         \x20 login <email> <password>             sign in\n\
         \x20 guest | logout                       drop to the guest session\n\
         \x20 profile                              show profile and BMI\n\
         \x20 profile set <name> <dob> <height_cm> <weight_kg> <activity...>\n\
         \x20 log <date|today> <calories> <protein> <carbs> <fat> <fiber> <sugar> <sodium> <meal...>\n\
         \x20 meals [limit]                        list entries, newest first\n\
         \x20 edit <id> <date|today> <calories> <protein> <carbs> <fat> <fiber> <sugar> <sodium> <meal...>\n\
         \x20 delete <id>                          remove an entry\n\
         \x20 today                                today's nutrient totals\n\
         \x20 lookup <query...>                    search recipes, then 'accept <n> [date]'\n\
         \x20 ask <prompt...>                      ask the nutrition assistant\n\
         \x20 theme [name]                         show or change the theme\n\
         \x20 key spoonacular|groq <value>         save an API credential\n\
         \x20 quit"
    );
}

fn parse_date(token: &str) -> Result<NaiveDate> {
    if token.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| Error::Config(format!("'{token}' is not a date (expected YYYY-MM-DD)")))
}

fn require_member(user: &User) -> Result<i64> {
    if user.is_guest() {
        Err(Error::Config(
            "Not available in Guest Mode. Sign up or log in first.".to_string(),
        ))
    } else {
        Ok(user.id)
    }
}

async fn signup(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let [email, password, name @ ..] = args else {
        println!("Usage: signup <email> <password> [name]");
        return Ok(());
    };
    let name = name.join(" ");
    let user_id = db::create_user(&ctx.pool, email, password, &name).await?;
    ctx.user = User {
        id: user_id,
        email: (*email).to_string(),
        name: if name.is_empty() { (*email).to_string() } else { name },
    };
    println!("Welcome, {}! You are signed in.", ctx.user.name);
    Ok(())
}

async fn login(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let [email, password] = args else {
        println!("Usage: login <email> <password>");
        return Ok(());
    };
    match db::authenticate(&ctx.pool, email, password).await? {
        Some(user) => {
            println!("Welcome back, {}!", user.name);
            ctx.user = user;
        }
        None => println!("Invalid email or password."),
    }
    Ok(())
}

async fn profile(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    if let Some((&"set", rest)) = args.split_first() {
        let user_id = require_member(&ctx.user)?;
        let [name, dob, height, weight, activity @ ..] = rest else {
            println!("Usage: profile set <name> <dob> <height_cm> <weight_kg> <activity...>");
            return Ok(());
        };
        let height_cm: f64 = height
            .parse()
            .map_err(|_| Error::Config("Height must be a number.".to_string()))?;
        let weight_kg: f64 = weight
            .parse()
            .map_err(|_| Error::Config("Weight must be a number.".to_string()))?;
        let profile = Profile {
            user_id,
            name: (*name).to_string(),
            dob: (*dob).to_string(),
            height_cm,
            weight_kg,
            activity_level: activity.join(" "),
        };
        db::upsert_profile(&ctx.pool, &profile).await?;
        println!("Profile saved.");
        print_bmi(&profile);
        return Ok(());
    }

    let user_id = require_member(&ctx.user)?;
    match db::get_profile(&ctx.pool, user_id).await? {
        Some(profile) => {
            println!(
                "{} — born {}, {} cm, {} kg, {}",
                profile.name, profile.dob, profile.height_cm, profile.weight_kg,
                profile.activity_level
            );
            print_bmi(&profile);
        }
        None => println!("No profile saved yet. Use 'profile set ...'."),
    }
    Ok(())
}

fn print_bmi(profile: &Profile) {
    match health::bmi_from_measurements(profile.height_cm, profile.weight_kg) {
        Some(bmi) => println!("BMI: {} ({})", bmi.value, bmi.category),
        None => println!("BMI: -"),
    }
}

/// Parses the shared `<date> <calories> <six nutrients> <meal...>` tail of
/// `log` and `edit`. `Ok(None)` means a usage mistake; a malformed date is a
/// real error, surfaced the same way on both paths.
fn fields_from_args<'a>(args: &[&'a str]) -> Result<Option<(NaiveDate, MealFields<'a>, String)>> {
    let [date, calories, protein, carbs, fat, fiber, sugar, sodium, meal @ ..] = args else {
        return Ok(None);
    };
    if meal.is_empty() {
        return Ok(None);
    }
    let date = parse_date(date)?;
    let meal = meal.join(" ");
    Ok(Some((
        date,
        MealFields {
            meal: "", // replaced by the caller with the joined description
            calories,
            protein,
            carbs,
            fat,
            fiber,
            sugar,
            sodium,
        },
        meal,
    )))
}

async fn log_meal(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let user_id = require_member(&ctx.user)?;
    let Some((date, fields, meal)) = fields_from_args(args)? else {
        println!(
            "Usage: log <date|today> <calories> <protein> <carbs> <fat> <fiber> <sugar> <sodium> <meal...>"
        );
        return Ok(());
    };
    let fields = MealFields { meal: &meal, ..fields };
    let meal_id = db::add_meal(&ctx.pool, user_id, date, &fields).await?;
    println!("Logged entry {meal_id} for {date}.");
    Ok(())
}

async fn list_meals(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let limit = args.first().and_then(|s| s.parse::<u32>().ok());
    let entries = db::get_meals(&ctx.pool, ctx.user.id, limit).await?;
    if entries.is_empty() {
        println!("No meals logged.");
        return Ok(());
    }
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &MealLogEntry) {
    println!(
        "#{} {} {} — {} kcal | protein {} carbs {} fat {} fiber {} sugar {} sodium {}",
        entry.id, entry.date_log, entry.meal, entry.calories, entry.protein, entry.carbs,
        entry.fat, entry.fiber, entry.sugar, entry.sodium
    );
}

async fn edit_meal(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    require_member(&ctx.user)?;
    let Some((&id_token, rest)) = args.split_first() else {
        println!("Usage: edit <id> <date|today> <calories> ... <meal...>");
        return Ok(());
    };
    let meal_id: i64 = id_token
        .parse()
        .map_err(|_| Error::Config(format!("'{id_token}' is not an entry id")))?;
    let Some((date, fields, meal)) = fields_from_args(rest)? else {
        println!(
            "Usage: edit <id> <date|today> <calories> <protein> <carbs> <fat> <fiber> <sugar> <sodium> <meal...>"
        );
        return Ok(());
    };
    let fields = MealFields { meal: &meal, ..fields };
    db::update_meal(&ctx.pool, meal_id, date, &fields).await?;
    println!("Entry {meal_id} updated.");
    Ok(())
}

async fn delete_meal(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    require_member(&ctx.user)?;
    let Some(meal_id) = args.first().and_then(|s| s.parse::<i64>().ok()) else {
        println!("Usage: delete <id>");
        return Ok(());
    };
    db::delete_meal(&ctx.pool, meal_id).await?;
    println!("Entry {meal_id} deleted (if it existed).");
    Ok(())
}

async fn today(ctx: &mut AppContext) -> Result<()> {
    match analytics::totals_for_today(&ctx.pool, ctx.user.id).await? {
        None => println!("Please log in to track analytics."),
        Some(totals) if totals.is_empty() => println!("No data logged for today."),
        Some(totals) => print_totals(&totals),
    }
    Ok(())
}

fn print_totals(totals: &DailyTotals) {
    println!("Today's totals across {} entries:", totals.entries);
    println!("  Calories {:.1} kcal", totals.calories);
    println!("  Protein  {:.1} g", totals.protein);
    println!("  Carbs    {:.1} g", totals.carbs);
    println!("  Fat      {:.1} g", totals.fat);
    println!("  Fiber    {:.1} g", totals.fiber);
    println!("  Sugar    {:.1} g", totals.sugar);
    println!("  Sodium   {:.1} mg", totals.sodium);
}

async fn lookup(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let query = args.join(" ");
    // Run the blocking network call off the interactive loop; the awaited
    // handle is the only handoff back.
    let client = ctx.recipes.clone();
    let task = tokio::spawn(async move { client.search(&query).await });
    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Lookup task failed: {}", e);
            println!("Error: the lookup task failed unexpectedly.");
            return Ok(());
        }
    };

    match outcome {
        Ok(LookupOutcome::Recipes(hits)) => {
            for (i, hit) in hits.iter().enumerate() {
                println!("{}. {} — {} kcal", i + 1, hit.title, hit.calories);
            }
            println!("Use 'accept <n> [date]' to log one of these.");
            ctx.pending_hits = hits;
        }
        Ok(LookupOutcome::NoMatches) => {
            println!("No recipes matched. Try different terms.");
            ctx.pending_hits.clear();
        }
        Err(e) => println!("Error: {e}"),
    }
    Ok(())
}

async fn accept(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let user_id = require_member(&ctx.user)?;
    let Some(index) = args.first().and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: accept <n> [date]");
        return Ok(());
    };
    let Some(hit) = ctx.pending_hits.get(index.wrapping_sub(1)) else {
        println!("No pending recipe {index}. Run 'lookup' first.");
        return Ok(());
    };
    let date = match args.get(1) {
        Some(token) => parse_date(token)?,
        None => Local::now().date_naive(),
    };

    // The bundle-to-entry population step: calories as digits, the six
    // nutrient fields as "<quantity><unit>" strings.
    let bundle = &hit.nutrients;
    let calories = hit.calories.to_string();
    let (protein, carbs, fat, fiber, sugar, sodium) = (
        bundle.protein.to_field_string(),
        bundle.carbs.to_field_string(),
        bundle.fat.to_field_string(),
        bundle.fiber.to_field_string(),
        bundle.sugar.to_field_string(),
        bundle.sodium.to_field_string(),
    );
    let fields = MealFields {
        meal: &hit.title,
        calories: &calories,
        protein: &protein,
        carbs: &carbs,
        fat: &fat,
        fiber: &fiber,
        sugar: &sugar,
        sodium: &sodium,
    };
    let meal_id = db::add_meal(&ctx.pool, user_id, date, &fields).await?;
    println!("Logged '{}' as entry {meal_id} for {date}.", hit.title);
    Ok(())
}

async fn ask(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let prompt = args.join(" ");
    if prompt.is_empty() {
        println!("Usage: ask <prompt...>");
        return Ok(());
    }

    let mut client = ctx.chat.clone();
    let task = tokio::spawn(async move { client.generate(&prompt).await });
    match task.await {
        Ok(Ok(text)) => println!("{text}"),
        Ok(Err(e)) => {
            if matches!(e, ApiError::InvalidKey) {
                // The clone dropped its key; mirror that here so the next
                // call reports MissingKey until a new key is saved.
                ctx.chat.invalidate();
            }
            println!("Error: {e}");
        }
        Err(e) => {
            warn!("Chat task failed: {}", e);
            println!("Error: the chat task failed unexpectedly.");
        }
    }
    Ok(())
}

fn theme(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    if args.is_empty() {
        println!("Current theme: {}", ctx.settings.theme);
        println!(
            "Available: {}",
            Theme::ALL.map(|t| t.name()).join(", ")
        );
        return Ok(());
    }
    let theme: Theme = args.join(" ").parse()?;
    ctx.settings.theme = theme;
    ctx.settings.save(&ctx.settings_path)?;
    println!("Theme set to {theme}.");
    Ok(())
}

fn set_key(ctx: &mut AppContext, args: &[&str]) -> Result<()> {
    let [service, value] = args else {
        println!("Usage: key spoonacular|groq <value>");
        return Ok(());
    };
    match *service {
        "spoonacular" => {
            ctx.settings.spoonacular_api_key = (*value).to_string();
            ctx.recipes.set_api_key(value);
        }
        "groq" => {
            ctx.settings.groq_api_key = (*value).to_string();
            ctx.chat.configure(value);
        }
        other => {
            println!("Unknown service '{other}'. Use 'spoonacular' or 'groq'.");
            return Ok(());
        }
    }
    ctx.settings.save(&ctx.settings_path)?;
    println!("Saved {service} API key.");
    Ok(())
}
