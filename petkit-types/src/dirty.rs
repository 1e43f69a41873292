//! Cached-state fields invalidated by mutating commands

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::Error;

/// A named cached field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyField {
    Led,
    Dnd,
    Mode,
    Filter,
    /// Every cached field
    All,
}

impl DirtyField {
    /// Name used by the state collaborator
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Led => "led",
            Self::Dnd => "dnd",
            Self::Mode => "mode",
            Self::Filter => "filter",
            Self::All => "all",
        }
    }
}

impl fmt::Display for DirtyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirtyField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "led" => Ok(Self::Led),
            "dnd" => Ok(Self::Dnd),
            "mode" => Ok(Self::Mode),
            "filter" => Ok(Self::Filter),
            "all" => Ok(Self::All),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

bitflags! {
    /// Set of dirty fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFields: u8 {
        const LED = 1;
        const DND = 1 << 1;
        const MODE = 1 << 2;
        const FILTER = 1 << 3;
        const ALL = 1 << 4;
    }
}

impl DirtyFields {
    /// Check if `field` is marked
    pub fn has(self, field: DirtyField) -> bool {
        self.contains(field.into())
    }

    /// Marked fields, in declaration order
    pub fn fields(self) -> Vec<DirtyField> {
        [
            DirtyField::Led,
            DirtyField::Dnd,
            DirtyField::Mode,
            DirtyField::Filter,
            DirtyField::All,
        ]
        .into_iter()
        .filter(|field| self.has(*field))
        .collect()
    }
}

impl From<DirtyField> for DirtyFields {
    fn from(field: DirtyField) -> Self {
        match field {
            DirtyField::Led => Self::LED,
            DirtyField::Dnd => Self::DND,
            DirtyField::Mode => Self::MODE,
            DirtyField::Filter => Self::FILTER,
            DirtyField::All => Self::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_names() {
        for field in ["led", "dnd", "mode", "filter", "all"] {
            assert_eq!(field.parse::<DirtyField>().unwrap().as_str(), field);
        }
        assert!("water".parse::<DirtyField>().is_err());
    }

    #[test]
    fn test_fields_set() {
        let mut set = DirtyFields::empty();
        set |= DirtyFields::from(DirtyField::Led);
        set |= DirtyFields::from(DirtyField::Filter);

        assert!(set.has(DirtyField::Led));
        assert!(!set.has(DirtyField::Dnd));
        assert_eq!(set.fields(), vec![DirtyField::Led, DirtyField::Filter]);
    }

    #[test]
    fn test_all_is_its_own_field() {
        let set = DirtyFields::from(DirtyField::All);
        assert_eq!(set.fields(), vec![DirtyField::All]);
        assert!(!set.has(DirtyField::Led));
    }
}
