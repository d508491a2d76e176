use std::fmt;
use std::str::FromStr;

/// Account role, stored as text in the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    JobSeeker,
    Recruiter,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "job_seeker",
            UserRole::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "job_seeker" => Ok(Self::JobSeeker),
            "recruiter" => Ok(Self::Recruiter),
            other => Err(format!("{} is not a valid user role", other)),
        }
    }
}
