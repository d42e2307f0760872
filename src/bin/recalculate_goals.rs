//! Recalculate stored nutrition goals from current biometrics
//! Usage: cargo run --bin recalculate_goals -- [user id]

use chrono::Utc;

use nutritrack::config::Config;
use nutritrack::db::{self, Database};
use nutritrack::models::{User, USERS_COLLECTION};
use nutritrack::store::{DocumentStore, SqliteDocumentStore};
use nutritrack::tools::users;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let only_uid = args.get(1).map(|s| s.as_str());

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| db::migrations::run_migrations(conn))?;
    let store = SqliteDocumentStore::new(database);

    let ids: Vec<String> = match only_uid {
        Some(uid) => vec![uid.to_string()],
        None => store
            .query(USERS_COLLECTION, &[], None)?
            .into_iter()
            .filter_map(|doc| doc.get("id").and_then(|id| id.as_str()).map(String::from))
            .collect(),
    };
    println!("Recalculating goals for {} user(s)", ids.len());

    let now = Utc::now();
    let mut failed = 0;

    for uid in &ids {
        let before: Option<User> = users::get_user(&store, uid).ok();

        match users::recalculate_goals(&store, uid, now) {
            Ok(after) => {
                let old = before.map(|u| u.goals.target_calories).unwrap_or_default();
                println!("\nUser {}", uid);
                println!(
                    "  Activity: {} | Goal: {}",
                    after.goals.activity_level.as_str(),
                    after.goals.nutrition_goal.as_str()
                );
                println!("  BMR: {:.1} | TDEE: {:.1}", after.goals.bmr, after.goals.tdee);
                println!("  Old calories: {}", old);
                println!("  New calories: {}", after.goals.target_calories);
                println!(
                    "  Protein {:.1} g | Carbs {:.1} g | Fat {:.1} g",
                    after.goals.target_protein, after.goals.target_carbs, after.goals.target_fat
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("\nUser {}: {}", uid, e);
            }
        }
    }

    println!("\nDone: {} updated, {} failed", ids.len() - failed, failed);
    Ok(())
}
