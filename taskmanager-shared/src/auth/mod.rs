/// Authentication
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and password rules
/// - [`jwt`]: HS256 token signing and validation
/// - [`session`]: issue, verify and revoke sessions against the user store
/// - [`middleware`]: the Axum bearer-token gate
///
/// # Example
///
/// ```no_run
/// use taskmanager_shared::auth::password::{hash_password, verify_password};
/// use taskmanager_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("MyPass777")?;
/// assert!(verify_password("MyPass777", &hash)?);
///
/// let token = create_token(&Claims::new(uuid::Uuid::new_v4()), "a-secret-that-is-long-enough-to-use")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
