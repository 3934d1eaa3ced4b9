/// Lifetime class of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Display preferences, kept across logins
    Preferences,
    /// Auth token and user record, removed on logout
    Session,
}

impl Scope {
    /// Every scope, in schema creation order
    pub const ALL: [Scope; 2] = [Scope::Preferences, Scope::Session];

    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            Scope::Preferences => "preferences",
            Scope::Session => "session",
        }
    }
}
