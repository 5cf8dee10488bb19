use std::fmt;

/// Contract artifact name as forge resolves it inside the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub name: String,
}

impl ContractSpec {
    pub fn name(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
