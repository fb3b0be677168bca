#![forbid(unsafe_code)]

pub mod actor;
pub mod category;
pub mod config;
pub mod content;
pub mod error;
pub mod notify;
pub mod permission;
pub mod resolver;
pub mod sequence;
pub mod tree;

pub use actor::Actor;
pub use category::{Category, categorize};
pub use config::EngineConfig;
pub use error::KnowledgeError;
pub use permission::{AccessLevel, Permission};

pub mod ids {
    use std::fmt;

    macro_rules! row_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(i64);

            impl $name {
                pub const fn new(value: i64) -> Self {
                    Self(value)
                }

                pub const fn get(self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }
        };
    }

    row_id!(
        /// Primary key of an article row.
        ArticleId
    );
    row_id!(
        /// Contact identity a member grant is attached to.
        PartnerId
    );
    row_id!(UserId);
    row_id!(
        /// Organizational unit (department) an actor may belong to.
        UnitId
    );
    row_id!(StageId);
    row_id!(MemberId);
    row_id!(FavoriteId);

    /// Opaque public share token: 32 lowercase hex characters.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ShareToken(String);

    impl ShareToken {
        pub fn generate() -> Self {
            Self(uuid::Uuid::new_v4().simple().to_string())
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ShareTokenError> {
            let value = value.into();
            validate_share_token(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ShareTokenError {
        InvalidLength(usize),
        InvalidChar { ch: char, index: usize },
    }

    fn validate_share_token(value: &str) -> Result<(), ShareTokenError> {
        if value.len() != 32 {
            return Err(ShareTokenError::InvalidLength(value.len()));
        }
        for (index, ch) in value.chars().enumerate() {
            if !matches!(ch, '0'..='9' | 'a'..='f') {
                return Err(ShareTokenError::InvalidChar { ch, index });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn generated_share_tokens_are_valid_and_distinct() {
            let a = ShareToken::generate();
            let b = ShareToken::generate();
            assert!(ShareToken::try_new(a.as_str()).is_ok());
            assert_ne!(a, b);
        }

        #[test]
        fn share_token_validation() {
            assert_eq!(
                ShareToken::try_new("abc").unwrap_err(),
                ShareTokenError::InvalidLength(3)
            );
            assert_eq!(
                ShareToken::try_new("G".repeat(32)).unwrap_err(),
                ShareTokenError::InvalidChar { ch: 'G', index: 0 }
            );
        }
    }
}
