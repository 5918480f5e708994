//! IAM statements attached to the sync function's role

use crate::strategy::BindingStrategy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyStatement {
    pub actions: Vec<&'static str>,
    pub resources: Vec<&'static str>,
}

impl PolicyStatement {
    fn new(actions: &[&'static str], resources: &[&'static str]) -> Self {
        Self {
            actions: actions.to_vec(),
            resources: resources.to_vec(),
        }
    }

    /// Every (action, resource) pair this statement allows.
    pub fn grants(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.actions.iter().flat_map(move |action| {
            self.resources
                .iter()
                .map(move |resource| (*action, *resource))
        })
    }
}

/// Read-only inspection of API Gateway, needed in every mode.
pub fn baseline_statements() -> Vec<PolicyStatement> {
    vec![PolicyStatement::new(
        &["apigateway:GET"],
        &[
            "arn:aws:apigateway:*::/restapis/*/deployments/*",
            "arn:aws:apigateway:*::/restapis/*/resources",
            "arn:aws:apigateway:*::/restapis/*/authorizers",
            "arn:aws:apigateway:*::/restapis/*/stages",
            "arn:aws:apigateway:*::/restapis",
        ],
    )]
}

/// Registering the authorizer and patching methods to use it.
pub fn auto_bind_statements() -> Vec<PolicyStatement> {
    vec![
        PolicyStatement::new(&["lambda:AddPermission"], &["*"]),
        PolicyStatement::new(
            &["apigateway:PATCH"],
            &["arn:aws:apigateway:*::/restapis/*/resources/*/methods/*"],
        ),
        PolicyStatement::new(
            &["apigateway:POST"],
            &["arn:aws:apigateway:*::/restapis/*/authorizers"],
        ),
    ]
}

pub fn statements_for(binding: BindingStrategy) -> Vec<PolicyStatement> {
    let mut statements = baseline_statements();
    if binding.is_auto() {
        statements.extend(auto_bind_statements());
    }
    statements
}
