use adaptorm::*;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

fn schemas() -> Vec<TableSchema> {
    vec![
        TableSchema::new("users")
            .column(ColumnDefinition::new("id", "INTEGER").primary_key())
            .column(ColumnDefinition::new("name", "TEXT"))
            .column(ColumnDefinition::new("email", "TEXT")),
        TableSchema::new("posts")
            .column(ColumnDefinition::new("id", "INTEGER").primary_key())
            .column(ColumnDefinition::new("user_id", "INTEGER"))
            .column(ColumnDefinition::new("title", "TEXT").default_value("'untitled'")),
    ]
}

#[tokio::main]
async fn main() -> OrmResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adaptorm=debug")),
        )
        .init();

    // DATABASE_URL selects a server; otherwise everything stays in memory
    let config = match std::env::var("DATABASE_URL") {
        Ok(url) if url.starts_with("postgres") => AdapterConfig::from_url(Dialect::Postgres, url),
        Ok(url) if url.starts_with("mysql") => AdapterConfig::from_url(Dialect::MySql, url),
        _ => AdapterConfig::sqlite(":memory:"),
    };

    let orm = Orm::from_config(&config, schemas());
    orm.connect().await?;
    orm.migrate().await?;

    let users = orm.table::<User>("users")?;
    let posts = orm.table::<Post>("posts")?;

    let ada = users.model(User {
        id: 1,
        name: "Ada".into(),
        email: "ada@mail.com".into(),
    });
    ada.save().await?;
    users
        .model(User {
            id: 2,
            name: "Grace".into(),
            email: "grace@mail.com".into(),
        })
        .create()
        .await?;
    posts
        .model(Post {
            id: 1,
            user_id: 1,
            title: "Notes on the Analytical Engine".into(),
        })
        .save()
        .await?;

    let found = users
        .find_one_as(&conditions([("email", Value::from("ada@mail.com"))]))
        .await?;
    println!("{:?}", found);

    let ada_posts = posts.find_by_as(&conditions([("user_id", Value::from(1))])).await?;
    println!("posts by ada {:?}", ada_posts);

    let all_users = users.find_all_as(1, DEFAULT_PAGE_SIZE).await?;
    println!("All users: {:?}", all_users);
    println!("User count: {}", users.count(&Conditions::new()).await?);

    ada.delete().await?;
    println!("After delete: {:?}", users.find_by_id(1).await?);

    let rows = orm.raw("SELECT COUNT(*) AS n FROM posts", &[]).await?;
    println!("Raw: {:?}", rows);

    posts.drop_table().await?;
    users.drop_table().await?;
    orm.disconnect().await?;

    Ok(())
}
