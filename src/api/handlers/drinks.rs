use axum::{extract::State, Json};
use serde_json::{json, Value};
use sqlx::SqliteConnection;
use std::sync::Arc;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::middleware::rbac::{Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks};
use crate::api::AppState;
use crate::db;
use crate::db::models::drink::{normalize_title, CreateDrinkRequest, Drink, Recipe, UpdateDrinkRequest};
use crate::error::{AppError, AppResult};

async fn all_drinks(state: &AppState) -> AppResult<Vec<Drink>> {
    let drinks: Vec<Drink> = sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(drinks)
}

async fn find_drink(conn: &mut SqliteConnection, id: i64) -> AppResult<Drink> {
    sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Drink {} not found", id)))
}

/// Fails with 400 when another drink already uses `title`.
async fn ensure_title_free(conn: &mut SqliteConnection, title: &str, except: Option<i64>) -> AppResult<()> {
    let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM drinks WHERE title = ? AND id != ? LIMIT 1")
        .bind(title)
        .bind(except.unwrap_or(-1))
        .fetch_optional(&mut *conn)
        .await?;

    match taken {
        Some(_) => Err(duplicate_title(title)),
        None => Ok(()),
    }
}

fn duplicate_title(title: &str) -> AppError {
    AppError::BadRequest(format!("A drink titled '{}' already exists", title))
}

// A concurrent writer can still win the race past `ensure_title_free`.
fn map_unique_violation(e: sqlx::Error, title: &str) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => duplicate_title(title),
        _ => AppError::Database(e),
    }
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let drinks = all_drinks(&state)
        .await?
        .iter()
        .map(Drink::short)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(json!({ "success": true, "drinks": drinks })))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<GetDrinksDetail>,
) -> AppResult<Json<Value>> {
    let drinks = all_drinks(&state)
        .await?
        .iter()
        .map(Drink::long)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(json!({ "success": true, "drinks": drinks })))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: Authorized<PostDrinks>,
    ApiJson(body): ApiJson<CreateDrinkRequest>,
) -> AppResult<Json<Value>> {
    let (Some(title), Some(recipe)) = (body.title, body.recipe) else {
        return Err(AppError::BadRequest("Both title and recipe are required".to_string()));
    };
    let title = normalize_title(&title)?;
    let recipe = Recipe::from_value(recipe)?;

    let mut tx = db::begin_write(&state.db).await?;
    ensure_title_free(&mut tx, &title, None).await?;

    let drink: Drink = sqlx::query_as(
        "INSERT INTO drinks (title, recipe) VALUES (?, ?)
         RETURNING id, title, recipe"
    )
    .bind(&title)
    .bind(recipe.to_json()?)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique_violation(e, &title))?;

    let formatted = drink.long()?;
    tx.commit().await?;

    tracing::info!(drink_id = drink.id, title = %drink.title, subject = auth.subject(), "Drink created");
    Ok(Json(json!({ "success": true, "drinks": [formatted] })))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: Authorized<PatchDrinks>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<UpdateDrinkRequest>, AppError>,
) -> AppResult<Json<Value>> {
    let mut tx = db::begin_write(&state.db).await?;
    find_drink(&mut tx, id).await?;

    let ApiJson(body) = body?;
    if body.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let title = match body.title {
        Some(raw) => {
            let title = normalize_title(&raw)?;
            ensure_title_free(&mut tx, &title, Some(id)).await?;
            Some(title)
        }
        None => None,
    };
    let recipe = match body.recipe {
        Some(raw) => Some(Recipe::from_value(raw)?.to_json()?),
        None => None,
    };

    let drink: Drink = sqlx::query_as(
        "UPDATE drinks SET title = COALESCE(?, title), recipe = COALESCE(?, recipe)
         WHERE id = ?
         RETURNING id, title, recipe"
    )
    .bind(title.as_deref())
    .bind(recipe.as_deref())
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique_violation(e, title.as_deref().unwrap_or_default()))?;

    let formatted = drink.long()?;
    tx.commit().await?;

    tracing::info!(drink_id = id, subject = auth.subject(), "Drink updated");
    Ok(Json(json!({ "success": true, "drinks": [formatted] })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: Authorized<DeleteDrinks>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Drink {} not found", id)));
    }

    tracing::info!(drink_id = id, subject = auth.subject(), "Drink deleted");
    Ok(Json(json!({ "success": true, "delete": id })))
}
