use serde_json::{json, Map, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Connect to `DATABASE_URL` and bring the schema up to date.
pub async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");
    db
}

/// Registration-style input with a unique email.
pub fn profile() -> Map<String, Value> {
    let tag = Uuid::new_v4().simple().to_string();
    let v = json!({
        "name": format!("User {tag}"),
        "email": format!("{tag}@example.com"),
        "password": "$argon2id$v=19$m=19456,t=2,p=1$stub",
        "country": "DE",
        "city": "Berlin",
        "email_verified": 0,
    });
    match v {
        Value::Object(m) => m,
        _ => unreachable!(),
    }
}
