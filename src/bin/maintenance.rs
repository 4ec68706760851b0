use std::env;

use anyhow::{bail, Context, Result};
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use ecocase::{
    auth::password,
    config::AppConfig,
    db,
    domain::Role,
    jobs::{enqueue_job, JOB_SCAN_COURT_DEADLINES},
    models::NewUser,
    schema::users,
};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("create-user") => create_user(&args[1..])?,
        Some("seed-deadline-scan") => seed_deadline_scan()?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

const USAGE: &str = "Usage:\n  maintenance create-user <email> <name> <password> <role>\n  maintenance seed-deadline-scan";

fn create_user(args: &[String]) -> Result<()> {
    let [email, name, pass, role] = args else {
        bail!("expected: create-user <email> <name> <password> <role>");
    };
    let role = Role::parse(role)
        .with_context(|| format!("unknown role {role} (officer|analyst|prosecutor|admin|citizen)"))?;

    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: email.clone(),
        name: name.clone(),
        password_hash: password::hash_password(pass)?,
        role: role.as_str().to_string(),
        active: true,
        badge_number: None,
        department: None,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(&mut conn)
        .context("failed to insert user")?;

    println!("Created {} user {} ({})", role.as_str(), email, new_user.id);
    Ok(())
}

fn seed_deadline_scan() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let job = enqueue_job(&mut conn, JOB_SCAN_COURT_DEADLINES, json!({}), None)
        .context("failed to enqueue deadline scan")?;

    println!("Enqueued deadline scan job {}", job.id);
    Ok(())
}
