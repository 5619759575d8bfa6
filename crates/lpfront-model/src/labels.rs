/// Human-readable names attached to a solution.
///
/// Models are name-agnostic; names are only joined to values when a raw
/// result is normalized. Anything left unnamed falls back to `C1..Cn` for
/// variables and `R1..Rm` for rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    variables: Vec<String>,
    constraints: Vec<String>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.variables = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraints<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.constraints = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn variable(&self, index: usize) -> String {
        self.variables
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("C{}", index + 1))
    }

    pub fn constraint(&self, index: usize) -> String {
        self.constraints
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("R{}", index + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let labels = Labels::new();
        assert_eq!(labels.variable(0), "C1");
        assert_eq!(labels.constraint(2), "R3");
    }

    #[test]
    fn test_short_name_list_falls_back() {
        let labels = Labels::new()
            .with_variables(["x4p", "x3p"])
            .with_constraints(vec!["labour".to_string()]);
        assert_eq!(labels.variable(1), "x3p");
        assert_eq!(labels.variable(2), "C3");
        assert_eq!(labels.constraint(0), "labour");
        assert_eq!(labels.constraint(1), "R2");
    }
}
