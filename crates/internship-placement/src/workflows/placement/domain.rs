use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier for a posted internship opportunity (`INT0001`).
    OpportunityId
);
identifier!(
    /// Identifier for a student's application (`APP0001`).
    ApplicationId
);
identifier!(
    /// Identifier for a withdrawal request (`WR0001`).
    WithdrawalRequestId
);
identifier!(StudentId);
identifier!(RepresentativeId);
identifier!(StaffId);

/// Seniority band of an opportunity. Anything above `Basic` is reserved for senior students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl InternshipLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    pub const fn requires_senior_standing(self) -> bool {
        !matches!(self, Self::Basic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Major {
    Cs,
    Dsai,
    Ce,
    Iem,
    Eee,
    Mae,
    Cee,
    Mse,
    Cbe,
    Business,
    Economics,
    Spms,
}

impl Major {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cs => "Computer Science",
            Self::Dsai => "Data Science & AI",
            Self::Ce => "Computer Engineering",
            Self::Iem => "Information Engineering & Media",
            Self::Eee => "Electrical and Electronic Engineering",
            Self::Mae => "Mechanical and Aerospace Engineering",
            Self::Cee => "Civil and Environmental Engineering",
            Self::Mse => "Materials Science and Engineering",
            Self::Cbe => "Chemical and Biomolecular Engineering",
            Self::Business => "Business",
            Self::Economics => "Economics",
            Self::Spms => "School of Physics and Math",
        }
    }
}

/// Review state of an opportunity. `Filled` is reachable only from `Approved` via slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Pending,
    Approved,
    Rejected,
    Filled,
}

impl OpportunityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Filled => "All Slots Filled",
        }
    }

    /// Representatives may only edit or delete listings that have not gone live.
    pub const fn is_open_for_revision(self) -> bool {
        matches!(self, Self::Pending | Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending Review",
            Self::Successful => "Approved by Company",
            Self::Unsuccessful => "Rejected by Company",
            Self::Withdrawn => "Withdrawn",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Unsuccessful | Self::Withdrawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Student identity and eligibility facts supplied by the caller for each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    pub year_of_study: u8,
    pub major: Major,
}

/// Company representative acting on their own listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeProfile {
    pub id: RepresentativeId,
    pub company_name: String,
}
