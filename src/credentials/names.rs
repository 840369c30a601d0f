/// Every cookie the login flow may write.
///
/// Names must match the external login flow byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthCookie {
    User,
    Token,
    TempToken,
    LoginSchools,
    SelectedSchool,
    Permissions,
    CurrentSchool,
}

impl AuthCookie {
    /// The full known enumeration. [`Credentials::clear_all`](super::Credentials::clear_all)
    /// walks this list, never a caller-supplied subset.
    pub const ALL: [Self; 7] = [
        Self::User,
        Self::Token,
        Self::TempToken,
        Self::LoginSchools,
        Self::SelectedSchool,
        Self::Permissions,
        Self::CurrentSchool,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "portal_user",
            Self::Token => "portal_token",
            Self::TempToken => "portal_temp_token",
            Self::LoginSchools => "portal_login_schools",
            Self::SelectedSchool => "portal_selected_school",
            Self::Permissions => "portal_permissions",
            Self::CurrentSchool => "seed_current_school",
        }
    }

    /// Whether the value is JSON-encoded (as opposed to an opaque string).
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(
            self,
            Self::User | Self::LoginSchools | Self::SelectedSchool | Self::Permissions
        )
    }
}

impl AsRef<str> for AuthCookie {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl std::fmt::Display for AuthCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
