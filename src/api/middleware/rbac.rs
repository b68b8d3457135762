use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::marker::PhantomData;
use std::sync::Arc;

use super::auth::AuthUser;
use crate::api::AppState;
use crate::auth::jwt::Claims;
use crate::auth::rbac::{check_permission, Permission};
use crate::error::AppError;

/// Marker naming the permission a route requires.
pub trait RequiredPermission {
    const PERMISSION: Permission;
}

pub struct GetDrinksDetail;
pub struct PostDrinks;
pub struct PatchDrinks;
pub struct DeleteDrinks;

impl RequiredPermission for GetDrinksDetail {
    const PERMISSION: Permission = Permission::GetDrinksDetail;
}

impl RequiredPermission for PostDrinks {
    const PERMISSION: Permission = Permission::PostDrinks;
}

impl RequiredPermission for PatchDrinks {
    const PERMISSION: Permission = Permission::PatchDrinks;
}

impl RequiredPermission for DeleteDrinks {
    const PERMISSION: Permission = Permission::DeleteDrinks;
}

/// Axum extractor that authenticates the caller and requires permission `P`.
/// Runs before the body is read: 401 on a bad token, 400 when the token has
/// no permissions claim, 403 when `P` is not granted.
pub struct Authorized<P>(pub Claims, PhantomData<fn() -> P>);

impl<P> Authorized<P> {
    pub fn subject(&self) -> &str {
        self.0.subject()
    }
}

impl<P> FromRequestParts<Arc<AppState>> for Authorized<P>
where
    P: RequiredPermission,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        check_permission(&claims, P::PERMISSION)?;
        Ok(Authorized(claims, PhantomData))
    }
}
