// PSPP - a program for statistical analysis.
// Copyright (C) 2025 Free Software Foundation, Inc.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Column names.

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    ops::Deref,
};

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error as ThisError;
use unicase::UniCase;

/// Words that the SPSS syntax reserves, which therefore cannot name a column.
const RESERVED_WORDS: [&str; 13] = [
    "ALL", "AND", "BY", "EQ", "GE", "GT", "LE", "LT", "NE", "NOT", "OR", "TO", "WITH",
];

fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(s))
}

/// Returns true if `c` may be the first character in a column name.
fn may_start(c: char) -> bool {
    if c.is_ascii() {
        matches!(c, 'a'..='z' | 'A'..='Z' | '@' | '#' | '$')
    } else {
        c.is_alphabetic() && c != char::REPLACEMENT_CHARACTER
    }
}

/// Returns true if `c` may be a later character in a column name.
fn may_continue(c: char) -> bool {
    if c.is_ascii() {
        matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '@' | '#' | '$' | '.' | '_')
    } else {
        c.is_alphanumeric() && c != char::REPLACEMENT_CHARACTER
    }
}

/// An invalid column name.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum Error {
    #[error("Column name cannot be empty.")]
    Empty,

    #[error("{0:?} is a reserved word.")]
    Reserved(String),

    #[error("{string:?} begins with disallowed character {c:?}.")]
    BadFirstCharacter { string: String, c: char },

    #[error("{string:?} contains disallowed character {c:?}.")]
    BadLaterCharacter { string: String, c: char },

    #[error("{id:?} is {length} bytes in {encoding}, which exceeds the {max}-byte limit.")]
    TooLong {
        id: String,
        length: usize,
        encoding: &'static str,
        max: usize,
    },

    #[error("{id:?} cannot be represented in {encoding}.")]
    NotEncodable { id: String, encoding: &'static str },
}

/// A column name.
///
/// Comparisons, hashing, and lookups ignore case, so `Age` and `AGE` name
/// the same column.  The original spelling is preserved for output.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(pub UniCase<String>);

impl Identifier {
    /// Maximum length of an identifier, in bytes.  The limit applies in the
    /// encoding of the file that will hold the column, not in UTF-8.
    pub const MAX_LEN: usize = 64;

    /// Validates `s` as a column name for a UTF-8 file.
    pub fn new(s: impl Into<UniCase<String>>) -> Result<Self, Error> {
        let s: UniCase<String> = s.into();
        Self::is_plausible(&s)?;
        let identifier = Identifier(s);
        identifier.check_encoding(UTF_8)?;
        Ok(identifier)
    }

    /// Checks whether this is a valid identifier in the given `encoding`.  An
    /// identifier that is valid in one encoding might be invalid in another
    /// because some characters are unencodable or because it is too long.
    pub fn check_encoding(&self, encoding: &'static Encoding) -> Result<(), Error> {
        let s = self.0.as_str();
        let (encoded, _, unencodable) = encoding.encode(s);
        if unencodable {
            return Err(Error::NotEncodable {
                id: s.into(),
                encoding: encoding.name(),
            });
        }
        if encoded.len() > Self::MAX_LEN {
            return Err(Error::TooLong {
                id: s.into(),
                length: encoded.len(),
                encoding: encoding.name(),
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }

    pub fn is_plausible(s: &str) -> Result<(), Error> {
        let mut chars = s.chars();
        let Some(first) = chars.next() else {
            return Err(Error::Empty);
        };
        if is_reserved_word(s) {
            return Err(Error::Reserved(s.into()));
        }
        if !may_start(first) {
            return Err(Error::BadFirstCharacter {
                string: s.into(),
                c: first,
            });
        }
        if let Some(c) = chars.find(|c| !may_continue(*c)) {
            return Err(Error::BadLaterCharacter {
                string: s.into(),
                c,
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0.eq(&UniCase::new(other))
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self.0)
    }
}

pub trait HasIdentifier {
    fn identifier(&self) -> &UniCase<String>;
}

/// Wraps `T` so that it compares, orders, and hashes by its identifier.
/// This lets an `IndexSet<ByIdentifier<T>>` act as an ordered map from name
/// to `T`.
pub struct ByIdentifier<T>(pub T)
where
    T: HasIdentifier;

impl<T> ByIdentifier<T>
where
    T: HasIdentifier,
{
    pub fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T> PartialEq for ByIdentifier<T>
where
    T: HasIdentifier,
{
    fn eq(&self, other: &Self) -> bool {
        self.0.identifier().eq(other.0.identifier())
    }
}

impl<T> Eq for ByIdentifier<T> where T: HasIdentifier {}

impl<T> PartialOrd for ByIdentifier<T>
where
    T: HasIdentifier,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ByIdentifier<T>
where
    T: HasIdentifier,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.identifier().cmp(other.0.identifier())
    }
}

impl<T> Hash for ByIdentifier<T>
where
    T: HasIdentifier,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.identifier().hash(state)
    }
}

impl<T> Borrow<UniCase<String>> for ByIdentifier<T>
where
    T: HasIdentifier,
{
    fn borrow(&self) -> &UniCase<String> {
        self.0.identifier()
    }
}

impl<T> Debug for ByIdentifier<T>
where
    T: HasIdentifier + Debug,
{
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        self.0.fmt(f)
    }
}

impl<T> Clone for ByIdentifier<T>
where
    T: HasIdentifier + Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for ByIdentifier<T>
where
    T: HasIdentifier,
{
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use encoding_rs::WINDOWS_1252;

    use crate::identifier::{Error, Identifier};

    #[test]
    fn plausible() {
        for name in ["age", "Q1_a", "@weight", "#tmp", "$sys", "v.1", "größe"] {
            assert_eq!(Identifier::is_plausible(name), Ok(()), "{name}");
        }
    }

    #[test]
    fn implausible() {
        assert_eq!(Identifier::is_plausible(""), Err(Error::Empty));
        assert_eq!(
            Identifier::is_plausible("with"),
            Err(Error::Reserved(String::from("with")))
        );
        assert_eq!(
            Identifier::is_plausible("1st"),
            Err(Error::BadFirstCharacter {
                string: String::from("1st"),
                c: '1'
            })
        );
        assert_eq!(
            Identifier::is_plausible("first name"),
            Err(Error::BadLaterCharacter {
                string: String::from("first name"),
                c: ' '
            })
        );
    }

    #[test]
    fn case_insensitive() {
        let a = Identifier::new("Gender").unwrap();
        let b = Identifier::new("GENDER").unwrap();
        assert_eq!(a, b);
        assert!(a == *"gender");
        assert_eq!(a.as_str(), "Gender");
    }

    #[test]
    fn encoding_limits() {
        let long = "x".repeat(Identifier::MAX_LEN + 1);
        assert!(matches!(
            Identifier::new(long),
            Err(Error::TooLong { length: 65, .. })
        ));

        // Two UTF-8 bytes but one windows-1252 byte each.
        let name = "é".repeat(40);
        assert!(matches!(
            Identifier::new(name),
            Err(Error::TooLong { length: 80, .. })
        ));
        let shorter = Identifier::new("é".repeat(30)).unwrap();
        assert_eq!(shorter.check_encoding(WINDOWS_1252), Ok(()));

        let japanese = Identifier::new("日本").unwrap();
        assert!(matches!(
            japanese.check_encoding(WINDOWS_1252),
            Err(Error::NotEncodable { .. })
        ));
    }
}
