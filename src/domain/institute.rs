use crate::error::{CardError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A payment-card issuing institute (brand).
///
/// The discriminant doubles as the index into the rule table, so variants are
/// kept in the same order as [`Institute::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Institute {
    AmericanExpress,
    DinersClub,
    DinersClubUS,
    Discover,
    JCB,
    Laser,
    Maestro,
    MasterCard,
    Solo,
    UnionPay,
    Visa,
}

impl Institute {
    /// Every known institute, in registry order.
    pub const ALL: [Institute; 11] = [
        Institute::AmericanExpress,
        Institute::DinersClub,
        Institute::DinersClubUS,
        Institute::Discover,
        Institute::JCB,
        Institute::Laser,
        Institute::Maestro,
        Institute::MasterCard,
        Institute::Solo,
        Institute::UnionPay,
        Institute::Visa,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Institute::AmericanExpress => "AmericanExpress",
            Institute::DinersClub => "DinersClub",
            Institute::DinersClubUS => "DinersClubUS",
            Institute::Discover => "Discover",
            Institute::JCB => "JCB",
            Institute::Laser => "Laser",
            Institute::Maestro => "Maestro",
            Institute::MasterCard => "MasterCard",
            Institute::Solo => "Solo",
            Institute::UnionPay => "UnionPay",
            Institute::Visa => "Visa",
        }
    }

    pub fn rule(&self) -> &'static InstituteRule {
        &RULES[*self as usize]
    }
}

impl fmt::Display for Institute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Institute {
    type Err = CardError;

    /// Parses an identifier case-insensitively, ignoring spaces, so both
    /// `AmericanExpress` and `American Express` are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Institute::ALL
            .into_iter()
            .find(|institute| institute.id().to_ascii_lowercase() == wanted)
            .ok_or_else(|| CardError::UnknownInstitute(s.to_string()))
    }
}

/// An inclusive range over the leading digits of a card number.
///
/// Bounds are compared at their own digit width: `622126..=622925` looks at
/// the first six digits, `51..=55` at the first two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRange {
    start: u32,
    end: u32,
    width: usize,
}

impl PrefixRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            width: digit_width(start),
        }
    }

    pub const fn exact(prefix: u32) -> Self {
        Self::new(prefix, prefix)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, number: &str) -> bool {
        number
            .get(..self.width)
            .filter(|lead| lead.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|lead| lead.parse::<u32>().ok())
            .is_some_and(|lead| (self.start..=self.end).contains(&lead))
    }
}

const fn digit_width(mut value: u32) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}

/// Prefix and length pattern of a single institute.
#[derive(Debug, PartialEq, Eq)]
pub struct InstituteRule {
    pub institute: Institute,
    pub allowed_lengths: &'static [usize],
    pub prefix_ranges: &'static [PrefixRange],
}

impl InstituteRule {
    pub fn accepts_prefix(&self, number: &str) -> bool {
        self.prefix_ranges.iter().any(|range| range.contains(number))
    }

    pub fn accepts_length(&self, number: &str) -> bool {
        self.allowed_lengths.contains(&number.len())
    }

    /// Length and prefix both fit. No checksum is involved.
    pub fn matches(&self, number: &str) -> bool {
        self.accepts_length(number) && self.accepts_prefix(number)
    }
}

static RULES: [InstituteRule; 11] = [
    InstituteRule {
        institute: Institute::AmericanExpress,
        allowed_lengths: &[15],
        prefix_ranges: &[PrefixRange::exact(34), PrefixRange::exact(37)],
    },
    InstituteRule {
        institute: Institute::DinersClub,
        allowed_lengths: &[14],
        prefix_ranges: &[PrefixRange::new(300, 305), PrefixRange::exact(36)],
    },
    InstituteRule {
        institute: Institute::DinersClubUS,
        allowed_lengths: &[16],
        prefix_ranges: &[PrefixRange::new(54, 55)],
    },
    InstituteRule {
        institute: Institute::Discover,
        allowed_lengths: &[16],
        prefix_ranges: &[
            PrefixRange::exact(6011),
            PrefixRange::new(622126, 622925),
            PrefixRange::new(644, 649),
            PrefixRange::exact(65),
        ],
    },
    InstituteRule {
        institute: Institute::JCB,
        allowed_lengths: &[16],
        prefix_ranges: &[PrefixRange::new(3528, 3589)],
    },
    InstituteRule {
        institute: Institute::Laser,
        allowed_lengths: &[16, 17, 18, 19],
        prefix_ranges: &[
            PrefixRange::exact(6304),
            PrefixRange::exact(6706),
            PrefixRange::exact(6709),
            PrefixRange::exact(6771),
        ],
    },
    InstituteRule {
        institute: Institute::Maestro,
        allowed_lengths: &[12, 13, 14, 15, 16, 17, 18, 19],
        prefix_ranges: &[
            PrefixRange::exact(5018),
            PrefixRange::exact(5020),
            PrefixRange::exact(5038),
            PrefixRange::exact(6304),
            PrefixRange::exact(6759),
            PrefixRange::exact(6761),
            PrefixRange::exact(6763),
        ],
    },
    InstituteRule {
        institute: Institute::MasterCard,
        allowed_lengths: &[16],
        prefix_ranges: &[PrefixRange::new(51, 55), PrefixRange::new(2221, 2720)],
    },
    InstituteRule {
        institute: Institute::Solo,
        allowed_lengths: &[16, 18, 19],
        prefix_ranges: &[PrefixRange::exact(6334), PrefixRange::exact(6767)],
    },
    InstituteRule {
        institute: Institute::UnionPay,
        allowed_lengths: &[16, 17, 18, 19],
        prefix_ranges: &[PrefixRange::new(622126, 622925)],
    },
    InstituteRule {
        institute: Institute::Visa,
        allowed_lengths: &[13, 16, 19],
        prefix_ranges: &[PrefixRange::exact(4)],
    },
];

/// Read-only lookup over the static rule table.
pub struct Registry;

impl Registry {
    pub fn lookup(id: &str) -> Option<&'static InstituteRule> {
        id.parse::<Institute>().ok().map(|institute| institute.rule())
    }

    pub fn all_ids() -> impl Iterator<Item = &'static str> {
        Institute::ALL.into_iter().map(|institute| institute.id())
    }

    pub fn matches(number: &str, rule: &InstituteRule) -> bool {
        rule.matches(number)
    }

    /// First institute in `selection` whose rule fully matches `number`.
    pub fn identify(number: &str, selection: &[Institute]) -> Option<Institute> {
        selection
            .iter()
            .copied()
            .find(|institute| institute.rule().matches(number))
    }
}
