//! Navigation menu

use std::fmt;
use std::str::FromStr;

/// A menu entry of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Section {
    #[default]
    History,
    Devices,
    Login,
    Logout,
    About,
}

impl Section {
    /// Menu order
    pub const ALL: [Section; 5] = [
        Section::History,
        Section::Devices,
        Section::Login,
        Section::Logout,
        Section::About,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::History => "history",
            Section::Devices => "devices",
            Section::Login => "login",
            Section::Logout => "logout",
            Section::About => "about",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::History => "Historical Data",
            Section::Devices => "Device Names",
            Section::Login => "Login",
            Section::Logout => "Logout",
            Section::About => "About",
        }
    }

    /// Only the login entry is usable without a session
    pub fn is_enabled(&self, logged_in: bool) -> bool {
        logged_in || *self == Section::Login
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "history" | "historical" => Ok(Section::History),
            "devices" | "device" | "names" => Ok(Section::Devices),
            "login" => Ok(Section::Login),
            "logout" => Ok(Section::Logout),
            "about" => Ok(Section::About),
            other => Err(format!("Unknown section: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_order_and_labels() {
        let labels: Vec<&str> = Section::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["Historical Data", "Device Names", "Login", "Logout", "About"]
        );
    }

    #[test]
    fn test_only_login_enabled_when_logged_out() {
        let enabled: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|s| s.is_enabled(false))
            .collect();
        assert_eq!(enabled, vec![Section::Login]);
        assert!(Section::ALL.iter().all(|s| s.is_enabled(true)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("History".parse::<Section>(), Ok(Section::History));
        assert_eq!(" devices ".parse::<Section>(), Ok(Section::Devices));
        assert!("settings".parse::<Section>().is_err());
    }
}
