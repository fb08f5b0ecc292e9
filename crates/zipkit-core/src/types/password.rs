//! Password and encryption mode types.

use zeroize::Zeroizing;

/// An archive password.
///
/// The secret is wiped from memory when the value is dropped and is never
/// printed by `Debug`. A `Password` is never empty: [`Password::new`] returns
/// `None` for an empty string, which is how the engine tells "no password"
/// apart from "password".
///
/// # Examples
///
/// ```
/// use zipkit_core::Password;
///
/// assert!(Password::new("").is_none());
///
/// let password = Password::new("hunter2").unwrap();
/// assert_eq!(format!("{password:?}"), "Password(***)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Creates a password, or `None` if `secret` is empty.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Returns the secret as a string slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the secret as bytes, as used by the ZIP key derivation.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Encryption applied when writing, or expected when reading, an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Encryption {
    /// Plain DEFLATE entries without confidentiality.
    #[default]
    None,
    /// WinZip AES-256 encrypted entries keyed by the password.
    Aes(Password),
}

impl Encryption {
    /// Selects the encryption mode from an optional password.
    ///
    /// A missing or empty password selects [`Encryption::None`].
    ///
    /// # Examples
    ///
    /// ```
    /// use zipkit_core::Encryption;
    ///
    /// assert_eq!(Encryption::from_password(None), Encryption::None);
    /// assert_eq!(Encryption::from_password(Some("")), Encryption::None);
    /// assert!(Encryption::from_password(Some("secret")).is_encrypted());
    /// ```
    #[must_use]
    pub fn from_password(password: Option<&str>) -> Self {
        password
            .and_then(Password::new)
            .map_or(Self::None, Self::Aes)
    }

    /// Returns `true` for [`Encryption::Aes`].
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Aes(_))
    }

    /// Returns the password, if any.
    #[must_use]
    pub const fn password(&self) -> Option<&Password> {
        match self {
            Self::None => None,
            Self::Aes(password) => Some(password),
        }
    }
}
