use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

pub const MAX_TITLE_LEN: usize = 80;
pub const MAX_RECIPE_LEN: usize = 180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// A row of the `drinks` table. `recipe` holds the JSON-encoded ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: String,
}

impl Drink {
    pub fn ingredients(&self) -> AppResult<Vec<Ingredient>> {
        Ok(serde_json::from_str(&self.recipe)?)
    }

    /// Public menu view: colors and proportions only.
    pub fn short(&self) -> AppResult<Value> {
        let recipe: Vec<Value> = self
            .ingredients()?
            .into_iter()
            .map(|i| json!({ "color": i.color, "parts": i.parts }))
            .collect();
        Ok(json!({ "id": self.id, "title": self.title, "recipe": recipe }))
    }

    /// Full recipe view, ingredient names included.
    pub fn long(&self) -> AppResult<Value> {
        Ok(json!({ "id": self.id, "title": self.title, "recipe": self.ingredients()? }))
    }
}

/// Validated ingredient list, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    /// Accepts a list of ingredients or a single ingredient object.
    pub fn from_value(value: Value) -> AppResult<Self> {
        let items = match value {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            Value::Null => return Err(AppError::BadRequest("recipe is required".to_string())),
            other => {
                return Err(AppError::Unprocessable(format!(
                    "recipe must be a list of ingredients, got {}",
                    other
                )))
            }
        };
        if items.is_empty() {
            return Err(AppError::BadRequest("recipe cannot be empty".to_string()));
        }

        let ingredients: Vec<Ingredient> = serde_json::from_value(Value::Array(items))
            .map_err(|e| AppError::Unprocessable(format!("invalid ingredient: {}", e)))?;

        for i in &ingredients {
            if i.name.trim().is_empty() {
                return Err(AppError::Unprocessable("ingredient name cannot be empty".to_string()));
            }
            if i.parts == 0 {
                return Err(AppError::Unprocessable(format!(
                    "ingredient '{}' must have at least one part",
                    i.name
                )));
            }
        }

        let recipe = Recipe(ingredients);
        let encoded = recipe.to_json()?;
        if encoded.chars().count() > MAX_RECIPE_LEN {
            return Err(AppError::Unprocessable(format!(
                "recipe is longer than {} characters once encoded",
                MAX_RECIPE_LEN
            )));
        }
        Ok(recipe)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Normalizes a drink title: trims it, uppercases the first letter of every
/// word and lowercases the rest. Any non-letter starts a new word.
pub fn normalize_title(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_word = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    if out.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Unprocessable(format!(
            "title is longer than {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<Value>,
}

impl UpdateDrinkRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}
