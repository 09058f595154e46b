use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which kind of worker a subtask is meant to be delegated to.
///
/// The graph engine only carries this through to the executor; it has no
/// effect on ordering or admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegateRole {
    Planner,
    Coder,
    Reviewer,
    Tester,
    Researcher,
}

impl DelegateRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelegateRole::Planner => "planner",
            DelegateRole::Coder => "coder",
            DelegateRole::Reviewer => "reviewer",
            DelegateRole::Tester => "tester",
            DelegateRole::Researcher => "researcher",
        }
    }
}

impl fmt::Display for DelegateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DelegateRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planner" => Ok(DelegateRole::Planner),
            "coder" => Ok(DelegateRole::Coder),
            "reviewer" => Ok(DelegateRole::Reviewer),
            "tester" => Ok(DelegateRole::Tester),
            "researcher" => Ok(DelegateRole::Researcher),
            other => Err(format!(
                "invalid delegate_role: {other} (expected one of planner, coder, reviewer, tester, researcher)"
            )),
        }
    }
}
