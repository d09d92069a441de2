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

//! Display formats.
//!
//! A display format such as `F8.2` or `A20` tells a reader how wide a column
//! is and how many decimal places to show.  Only the formats that correspond
//! to a [StorageType] are supported.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::RangeInclusive,
    str::FromStr,
};

use enum_iterator::{Sequence, all};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::DataFormatError, variable::StorageType};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence)]
pub enum Type {
    // Basic numeric formats.
    F,
    Comma,
    Dot,
    Dollar,
    Pct,
    E,

    // Time and date formats.
    Date,
    ADate,
    EDate,
    SDate,
    DateTime,
    YmdHms,
    MTime,
    Time,

    // String format.
    A,
}

pub type Width = u16;

pub type Decimals = u8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Basic,
    Date,
    DateTime,
    Time,
    String,
}

impl From<Type> for Category {
    fn from(source: Type) -> Self {
        match source {
            Type::F | Type::Comma | Type::Dot | Type::Dollar | Type::Pct | Type::E => Self::Basic,
            Type::Date | Type::ADate | Type::EDate | Type::SDate => Self::Date,
            Type::DateTime | Type::YmdHms => Self::DateTime,
            Type::MTime | Type::Time => Self::Time,
            Type::A => Self::String,
        }
    }
}

impl Type {
    pub fn max_width(self) -> Width {
        match self {
            Self::A => 32767,
            _ => 40,
        }
    }

    pub fn min_width(self) -> Width {
        match self {
            Self::F => 1,
            Self::Comma => 1,
            Self::Dot => 1,
            Self::Dollar => 2,
            Self::Pct => 2,
            Self::E => 6,
            Self::Date => 9,
            Self::ADate => 8,
            Self::EDate => 8,
            Self::SDate => 8,
            Self::DateTime => 17,
            Self::YmdHms => 16,
            Self::MTime => 5,
            Self::Time => 5,
            Self::A => 1,
        }
    }

    pub fn width_range(self) -> RangeInclusive<Width> {
        self.min_width()..=self.max_width()
    }

    pub fn max_decimals(self, width: Width) -> Decimals {
        let width = width.clamp(1, 40) as i16;
        let max = match self {
            Self::F | Self::Comma | Self::Dot => width - 1,
            Self::Dollar | Self::Pct => width - 2,
            Self::E => width - 7,
            Self::Date | Self::ADate | Self::EDate | Self::SDate => 0,
            Self::DateTime => width - 21,
            Self::YmdHms => width - 20,
            Self::MTime => width - 6,
            Self::Time => width - 9,
            Self::A => 0,
        };
        max.clamp(0, 16) as Decimals
    }

    pub fn takes_decimals(self) -> bool {
        self.max_decimals(Width::MAX) > 0
    }

    pub fn category(self) -> Category {
        self.into()
    }

    /// Returns true if a column of `storage_type` may be displayed in this
    /// format.
    pub fn is_compatible_with(self, storage_type: StorageType) -> bool {
        matches!(
            (self.category(), storage_type),
            (Category::Basic, StorageType::Numeric)
                | (Category::String, StorageType::String)
                | (Category::Date, StorageType::Date)
                | (Category::DateTime, StorageType::DateTime)
                | (Category::Time, StorageType::Time)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::F => "F",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::Dollar => "DOLLAR",
            Self::Pct => "PCT",
            Self::E => "E",
            Self::Date => "DATE",
            Self::ADate => "ADATE",
            Self::EDate => "EDATE",
            Self::SDate => "SDATE",
            Self::DateTime => "DATETIME",
            Self::YmdHms => "YMDHMS",
            Self::MTime => "MTIME",
            Self::Time => "TIME",
            Self::A => "A",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Type {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for type_ in all::<Type>() {
            if type_.as_str().eq_ignore_ascii_case(s) {
                return Ok(type_);
            }
        }
        Err(())
    }
}

/// A display format with a valid width and number of decimals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    type_: Type,
    w: Width,
    d: Decimals,
}

impl Format {
    pub const F8_2: Format = Format {
        type_: Type::F,
        w: 8,
        d: 2,
    };
    pub const F8_0: Format = Format {
        type_: Type::F,
        w: 8,
        d: 0,
    };
    pub const DATE11: Format = Format {
        type_: Type::Date,
        w: 11,
        d: 0,
    };
    pub const DATETIME20: Format = Format {
        type_: Type::DateTime,
        w: 20,
        d: 0,
    };
    pub const TIME8: Format = Format {
        type_: Type::Time,
        w: 8,
        d: 0,
    };

    /// Returns the format `type_w.d`, or `None` if `w` or `d` is out of range
    /// for `type_`.
    pub fn new(type_: Type, w: Width, d: Decimals) -> Option<Self> {
        if !type_.width_range().contains(&w) || d > type_.max_decimals(w) {
            None
        } else {
            Some(Self { type_, w, d })
        }
    }

    /// Returns an `A` format wide enough for strings of `width` bytes.
    pub fn for_string(width: usize) -> Self {
        let w = width.clamp(1, Type::A.max_width() as usize) as Width;
        Self {
            type_: Type::A,
            w,
            d: 0,
        }
    }

    /// Returns the usual format for a column of `storage_type`.
    pub fn default_for_type(storage_type: StorageType) -> Self {
        match storage_type {
            StorageType::Numeric => Self::F8_2,
            StorageType::String => Self::for_string(8),
            StorageType::Date => Self::DATE11,
            StorageType::DateTime => Self::DATETIME20,
            StorageType::Time => Self::TIME8,
        }
    }

    pub fn type_(self) -> Type {
        self.type_
    }

    pub fn w(self) -> usize {
        self.w as usize
    }

    pub fn d(self) -> usize {
        self.d as usize
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}{}", self.type_, self.w)?;
        if self.type_.takes_decimals() || self.d > 0 {
            write!(f, ".{}", self.d)?;
        }
        Ok(())
    }
}

fn split<F>(s: &str, predicate: F) -> (&str, &str)
where
    F: Fn(&char) -> bool,
{
    let rest = s.trim_start_matches(|c| predicate(&c));
    let start = &s[..s.len() - rest.len()];
    (start, rest)
}

impl FromStr for Format {
    type Err = DataFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || DataFormatError::InvalidFormat(s.into());

        let (name, rest) = split(s.trim(), char::is_ascii_alphabetic);
        let type_: Type = name.parse().map_err(|_| error())?;

        let (w, rest) = split(rest, char::is_ascii_digit);
        let w: Width = w.parse().map_err(|_| error())?;

        let (d, rest) = if let Some(rest) = rest.strip_prefix('.') {
            let (d, rest) = split(rest, char::is_ascii_digit);
            (d.parse().map_err(|_| error())?, rest)
        } else {
            (0, rest)
        };
        if !rest.is_empty() {
            return Err(error());
        }
        Format::new(type_, w, d).ok_or_else(error)
    }
}

impl Serialize for Format {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DataFormatError,
        format::{Format, Type},
        variable::StorageType,
    };

    #[test]
    fn parse_and_display() {
        for (input, expected) in [
            ("F8.2", "F8.2"),
            ("f8", "F8.0"),
            ("A20", "A20"),
            ("DATE11", "DATE11"),
            ("datetime20", "DATETIME20.0"),
            ("TIME11.2", "TIME11.2"),
            ("DOLLAR10.2", "DOLLAR10.2"),
        ] {
            let format: Format = input.parse().unwrap();
            assert_eq!(format.to_string(), expected, "{input}");
        }
    }

    #[test]
    fn invalid() {
        for input in ["", "F", "Q8.2", "F8.2x", "F41", "A0", "F8.9", "DATE5", "F.2"] {
            assert_eq!(
                input.parse::<Format>(),
                Err(DataFormatError::InvalidFormat(input.into())),
                "{input}"
            );
        }
    }

    #[test]
    fn compatibility() {
        assert!(Type::F.is_compatible_with(StorageType::Numeric));
        assert!(!Type::F.is_compatible_with(StorageType::String));
        assert!(Type::A.is_compatible_with(StorageType::String));
        assert!(Type::ADate.is_compatible_with(StorageType::Date));
        assert!(!Type::Date.is_compatible_with(StorageType::DateTime));
        assert!(Type::MTime.is_compatible_with(StorageType::Time));
        for storage_type in [
            StorageType::Numeric,
            StorageType::String,
            StorageType::Date,
            StorageType::DateTime,
            StorageType::Time,
        ] {
            assert!(
                Format::default_for_type(storage_type)
                    .type_()
                    .is_compatible_with(storage_type)
            );
        }
    }
}
