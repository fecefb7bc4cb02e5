use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    EngineError, RegisterCmd, ResultEngine, UserProfile,
    categories::CategoryKind,
    users,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Verified against when the username is unknown, so both failure paths cost
/// one Argon2 run.
const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
    gZiV/M1gPc22ElAH/Jh1Hw$\
    CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

impl Engine {
    /// Creates a user and seeds the default categories of every kind.
    pub async fn register(&self, cmd: RegisterCmd) -> ResultEngine<UserProfile> {
        let name = normalize_required_name(&cmd.name, "user")?;
        let username = normalize_username(&cmd.username)?;
        let email = normalize_optional_text(cmd.email.as_deref());
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }

        let password_hash = run_blocking(move || hash_password(&cmd.password)).await?;

        let profile = with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?;
            if taken.is_some() {
                return Err(EngineError::ExistingKey(username));
            }

            let user = users::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                username: ActiveValue::Set(username),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await?;

            tokio::try_join!(
                Self::seed_default_categories(&db_tx, user.id, CategoryKind::Income),
                Self::seed_default_categories(&db_tx, user.id, CategoryKind::Expense),
                Self::seed_default_categories(&db_tx, user.id, CategoryKind::Asset),
            )?;

            Ok(UserProfile::from(user))
        })?;

        tracing::info!(user_id = profile.id, "user registered");
        Ok(profile)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords are both [`EngineError::InvalidCredentials`].
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> ResultEngine<UserProfile> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?;

        let expected = user
            .as_ref()
            .map_or_else(|| FALLBACK_PASSWORD_HASH.to_string(), |u| u.password_hash.clone());
        let candidate = password.to_string();
        run_blocking(move || verify_password(&expected, &candidate)).await?;

        user.map(UserProfile::from)
            .ok_or(EngineError::InvalidCredentials)
    }

    pub async fn user_profile(&self, user_id: i64) -> ResultEngine<UserProfile> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}

fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidName(
            "username must not contain whitespace".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn argon2() -> ResultEngine<Argon2<'static>> {
    let params = Params::new(15000, 2, 1, None)
        .map_err(|err| EngineError::Crypto(format!("invalid argon2 parameters: {err}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Crypto(format!("failed to hash password: {err}")))
}

fn verify_password(expected: &str, candidate: &str) -> ResultEngine<()> {
    let expected = PasswordHash::new(expected)
        .map_err(|err| EngineError::Crypto(format!("stored hash is not a PHC string: {err}")))?;
    argon2()?
        .verify_password(candidate.as_bytes(), &expected)
        .map_err(|_| EngineError::InvalidCredentials)
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> ResultEngine<T>
where
    F: FnOnce() -> ResultEngine<T> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|err| EngineError::Crypto(format!("password task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "hunter2").is_ok());
        assert_eq!(
            verify_password(&hash, "hunter3").unwrap_err(),
            EngineError::InvalidCredentials
        );
    }

    #[test]
    fn fallback_hash_never_matches_empty_password() {
        assert_eq!(
            verify_password(FALLBACK_PASSWORD_HASH, "").unwrap_err(),
            EngineError::InvalidCredentials
        );
    }

    #[test]
    fn username_validation() {
        assert_eq!(normalize_username(" alice ").unwrap(), "alice");
        assert!(normalize_username("").is_err());
        assert!(normalize_username("al ice").is_err());
    }
}
