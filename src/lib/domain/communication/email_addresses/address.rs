//! Mailbox address with an optional display name

use std::{fmt, str::FromStr};

use super::{EmailAddress, EmailAddressError};

/// An email address with an optional display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    email: EmailAddress,
    name: Option<String>,
}

impl Address {
    /// Creates an address, discarding an empty display name
    pub fn new(email: EmailAddress, name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self { email, name }
    }

    /// The email part of the address
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<EmailAddress> for Address {
    fn from(email: EmailAddress) -> Self {
        Self { email, name: None }
    }
}

/// Parses either `email@example.com` or `Display Name <email@example.com>`.
impl FromStr for Address {
    type Err = EmailAddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        match (trimmed.rfind('<'), trimmed.strip_suffix('>')) {
            (Some(start), Some(inner)) => {
                let email = EmailAddress::new(&inner[start + 1..])?;
                let name = trimmed[..start].trim().trim_matches('"');

                Ok(Self::new(email, Some(name)))
            }
            _ => Ok(EmailAddress::new(trimmed)?.into()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_display_with_name() -> TestResult {
        let address = Address::new(EmailAddress::new("john@doe.email")?, Some("John Doe"));

        assert_eq!(address.to_string(), "John Doe <john@doe.email>");

        Ok(())
    }

    #[test]
    fn test_blank_name_is_dropped() -> TestResult {
        let address = Address::new(EmailAddress::new("john@doe.email")?, Some("  "));

        assert_eq!(address.name(), None);
        assert_eq!(address.to_string(), "john@doe.email");

        Ok(())
    }

    #[test]
    fn test_parse_mailbox() -> TestResult {
        let address: Address = "\"Admin User\" <admin@yoursite.com>".parse()?;

        assert_eq!(address.name(), Some("Admin User"));
        assert_eq!(address.email().as_str(), "admin@yoursite.com");

        Ok(())
    }

    #[test]
    fn test_parse_bare_email() -> TestResult {
        let address: Address = "recipient@example.com".parse()?;

        assert_eq!(address.name(), None);
        assert_eq!(address.email().as_str(), "recipient@example.com");

        Ok(())
    }

    #[test]
    fn test_parse_invalid_mailbox() {
        let result = "John <not an email>".parse::<Address>();

        assert!(matches!(
            result,
            Err(EmailAddressError::InvalidEmailAddress(_))
        ));
    }
}
