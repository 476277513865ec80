//! Plans: the action sequences chosen to satisfy a desire.

use serde::Serialize;

use crate::expression::Expression;
use crate::vocabulary::Logical;

/// An ordered list of conformity-valued actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// The desire this plan brings about, if any.
    pub goal: Option<Expression>,

    /// Actions in execution order.
    pub actions: Vec<Expression>,
}

impl Plan {
    /// Create a plan for a goal.
    pub fn new(goal: Expression, actions: Vec<Expression>) -> Self {
        Self {
            goal: Some(goal),
            actions,
        }
    }

    /// The plan of doing nothing.
    pub fn no_op() -> Self {
        Self {
            goal: None,
            actions: vec![Logical::Neutral.word()],
        }
    }

    /// Returns true for the plan of doing nothing.
    pub fn is_no_op(&self) -> bool {
        self.goal.is_none()
            && self.actions.len() == 1
            && Logical::Neutral.heads(&self.actions[0])
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the plan has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
