//! Authorization header values.
//!
//! An [`Authorization`] holds unexpanded [`Word`]s and turns them into a
//! header value when a request runs. Assembling the full header
//! (`"<method> <value>"`) is left to the caller, or to
//! [`Authorization::header_value`].

pub mod basic;
pub mod jwt;

use crate::environment::Environment;
use crate::word::{ExpandError, Word};
use jwt::{EncodeError, JwtEncoder};
use std::fmt;

/// Declared authorization scheme.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// HTTP Basic authentication (RFC 7617)
    Basic { user: Word, pass: Word },
    /// Bearer token authentication (RFC 6750)
    Bearer { token: Word },
    /// Bearer token minted from a JWT claim set
    JwtClaims {
        claims: Vec<(String, Vec<Word>)>,
        algorithm: String,
        secret: String,
    },
}

/// Errors that can occur while producing a header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A credential word failed to expand
    Expand(ExpandError),
    /// The JWT encoder rejected the claim set
    Encode(EncodeError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Expand(err) => write!(f, "{}", err),
            AuthError::Encode(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Expand(err) => Some(err),
            AuthError::Encode(err) => Some(err),
        }
    }
}

impl From<ExpandError> for AuthError {
    fn from(err: ExpandError) -> Self {
        AuthError::Expand(err)
    }
}

impl From<EncodeError> for AuthError {
    fn from(err: EncodeError) -> Self {
        AuthError::Encode(err)
    }
}

impl Authorization {
    /// Scheme label placed before the value in the header.
    pub fn method(&self) -> &'static str {
        match self {
            Authorization::Basic { .. } => "Basic",
            Authorization::Bearer { .. } | Authorization::JwtClaims { .. } => "Bearer",
        }
    }

    /// Expands the credentials into the header value, without the method.
    ///
    /// `encoder` is only consulted for [`Authorization::JwtClaims`].
    ///
    /// # Examples
    ///
    /// ```
    /// use reqdef::auth::{jwt::UnsecuredEncoder, Authorization};
    /// use reqdef::environment::Environment;
    /// use reqdef::word::Word;
    ///
    /// let auth = Authorization::Basic {
    ///     user: Word::literal("alice"),
    ///     pass: Word::literal("secret"),
    /// };
    /// let env = Environment::new();
    /// assert_eq!(auth.expand(&env, &UnsecuredEncoder).unwrap(), "YWxpY2U6c2VjcmV0");
    /// ```
    pub fn expand<E>(&self, env: &Environment<String>, encoder: &E) -> Result<String, AuthError>
    where
        E: JwtEncoder + ?Sized,
    {
        match self {
            Authorization::Basic { user, pass } => {
                let user = user.expand(env)?;
                let pass = pass.expand(env)?;
                Ok(basic::encode_credentials(&user, &pass))
            }
            Authorization::Bearer { token } => Ok(token.expand(env)?),
            Authorization::JwtClaims {
                claims,
                algorithm,
                secret,
            } => {
                let claims = jwt::assemble_claims(claims, env)?;
                Ok(encoder.encode(&claims, algorithm, secret)?)
            }
        }
    }

    /// Expands and prefixes the method, e.g. `"Bearer abc"`.
    pub fn header_value<E>(
        &self,
        env: &Environment<String>,
        encoder: &E,
    ) -> Result<String, AuthError>
    where
        E: JwtEncoder + ?Sized,
    {
        Ok(format!("{} {}", self.method(), self.expand(env, encoder)?))
    }
}

/// Debug output never includes the JWT secret.
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::Basic { user, pass } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("pass", pass)
                .finish(),
            Authorization::Bearer { token } => {
                f.debug_struct("Bearer").field("token", token).finish()
            }
            Authorization::JwtClaims {
                claims, algorithm, ..
            } => f
                .debug_struct("JwtClaims")
                .field("claims", claims)
                .field("algorithm", algorithm)
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}
