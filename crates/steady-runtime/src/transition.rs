use crate::error::RuntimeError;
use steady_model::{ServiceName, Substate};

/// Validates a caller-driven sub-state transition.
pub(crate) fn validate_transition(
    name: &ServiceName,
    from: Substate,
    to: Substate,
) -> Result<(), RuntimeError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(RuntimeError::IllegalTransition {
            name: name.clone(),
            from,
            to,
        })
    }
}

pub(crate) fn allowed_transitions(from: Substate) -> &'static [Substate] {
    use Substate::*;
    match from {
        New => &[Down, Problem, Removing],
        Down => &[Problem, Starting, Removing],
        Problem => &[Down, Removing],
        Starting => &[Up, StartFailed],
        StartFailed => &[Down, Removing],
        Up => &[Down, Removing],
        Removing => &[Removed],
        Removed => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> ServiceName {
        ServiceName::of(&["svc", "a"])
    }

    #[test]
    fn start_only_from_down() {
        assert!(validate_transition(&name(), Substate::Down, Substate::Starting).is_ok());
        assert!(validate_transition(&name(), Substate::Problem, Substate::Starting).is_err());
        assert!(validate_transition(&name(), Substate::Up, Substate::Starting).is_err());
    }

    #[test]
    fn starting_cannot_be_removed() {
        let err = validate_transition(&name(), Substate::Starting, Substate::Removing).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::IllegalTransition {
                from: Substate::Starting,
                to: Substate::Removing,
                ..
            }
        ));
    }

    #[test]
    fn removed_is_terminal() {
        assert!(allowed_transitions(Substate::Removed).is_empty());
    }
}
