use crate::auth::jwt::Claims;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    GetDrinksDetail,
    PostDrinks,
    PatchDrinks,
    DeleteDrinks,
}

impl Permission {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::GetDrinksDetail => "get:drinks-detail",
            Permission::PostDrinks => "post:drinks",
            Permission::PatchDrinks => "patch:drinks",
            Permission::DeleteDrinks => "delete:drinks",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token without a `permissions` claim is a bad request; one lacking the
/// required entry is forbidden.
pub fn check_permission(claims: &Claims, permission: Permission) -> Result<(), AppError> {
    let granted = claims.permissions.as_ref().ok_or_else(|| {
        AppError::BadRequest("token carries no permissions claim".to_string())
    })?;

    if granted.iter().any(|p| p == permission.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} lacks permission {}",
            claims.subject(),
            permission
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Option<&[&str]>) -> Claims {
        Claims {
            sub: Some("auth0|manager".to_string()),
            iss: None,
            aud: None,
            exp: 0,
            iat: None,
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_permission_strings() {
        assert_eq!(Permission::GetDrinksDetail.as_str(), "get:drinks-detail");
        assert_eq!(Permission::PostDrinks.as_str(), "post:drinks");
        assert_eq!(Permission::PatchDrinks.as_str(), "patch:drinks");
        assert_eq!(Permission::DeleteDrinks.as_str(), "delete:drinks");
    }

    #[test]
    fn test_granted_permission_passes() {
        let c = claims(Some(&["get:drinks-detail", "post:drinks"]));
        assert!(check_permission(&c, Permission::PostDrinks).is_ok());
    }

    #[test]
    fn test_missing_permission_is_forbidden() {
        let c = claims(Some(&["get:drinks-detail"]));
        assert!(matches!(
            check_permission(&c, Permission::DeleteDrinks),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_empty_permission_list_is_forbidden() {
        let c = claims(Some(&[]));
        assert!(matches!(
            check_permission(&c, Permission::GetDrinksDetail),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_absent_claim_is_bad_request() {
        let c = claims(None);
        assert!(matches!(
            check_permission(&c, Permission::PatchDrinks),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_match_is_exact() {
        let c = claims(Some(&["post:drinks-detail", "POST:DRINKS"]));
        assert!(check_permission(&c, Permission::PostDrinks).is_err());
    }
}
