use pgrad_core::error::PgError;
use std::{fmt, str::FromStr};

/// Name of a supported environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvName {
    /// [`Epidemic`](crate::Epidemic).
    Epidemic,

    /// [`CartPole`](crate::CartPole).
    CartPole,
}

impl FromStr for EnvName {
    type Err = PgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epidemic" => Ok(Self::Epidemic),
            "cartpole" => Ok(Self::CartPole),
            _ => Err(PgError::UnknownEnv(s.to_string())),
        }
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epidemic => write!(f, "epidemic"),
            Self::CartPole => write!(f, "cartpole"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("epidemic".parse::<EnvName>(), Ok(EnvName::Epidemic));
        assert_eq!("cartpole".parse::<EnvName>(), Ok(EnvName::CartPole));
        assert_eq!(EnvName::CartPole.to_string(), "cartpole");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            "unsupported_name".parse::<EnvName>(),
            Err(PgError::UnknownEnv("unsupported_name".to_string()))
        );
        assert!("CartPole".parse::<EnvName>().is_err());
    }
}
