use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::engine::types::ItemDifficulty;

#[derive(Debug, Clone)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub length: i32,
    pub difficulty: ItemDifficulty,
}

/// Inserts a learnable item. Length and the difficulty tag are derived once
/// from the text here and never recomputed.
pub async fn insert_item(pool: &PgPool, text: &str) -> Result<Item, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let length = text.chars().count();
    let difficulty = ItemDifficulty::from_length(length);

    sqlx::query(
        r#"
        INSERT INTO "items" ("id","text","length","difficulty")
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&id)
    .bind(text)
    .bind(length as i32)
    .bind(difficulty.as_str())
    .execute(pool)
    .await?;

    Ok(Item {
        id,
        text: text.to_string(),
        length: length as i32,
        difficulty,
    })
}

pub async fn get_item(pool: &PgPool, item_id: &str) -> Result<Option<Item>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id","text","length","difficulty" FROM "items" WHERE "id" = $1 LIMIT 1"#,
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let length: i32 = row.try_get("length").unwrap_or(0);
        Item {
            id: row.try_get("id").unwrap_or_default(),
            text: row.try_get("text").unwrap_or_default(),
            length,
            difficulty: row
                .try_get::<String, _>("difficulty")
                .ok()
                .as_deref()
                .and_then(parse_difficulty)
                .unwrap_or_else(|| ItemDifficulty::from_length(length.max(0) as usize)),
        }
    }))
}

fn parse_difficulty(value: &str) -> Option<ItemDifficulty> {
    match value {
        "short" => Some(ItemDifficulty::Short),
        "medium" => Some(ItemDifficulty::Medium),
        "long" => Some(ItemDifficulty::Long),
        "veryLong" => Some(ItemDifficulty::VeryLong),
        _ => None,
    }
}
