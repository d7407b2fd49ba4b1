//! Property-based tests for the transition guard
//!
//! These tests use proptest to check the accept/reject rules against
//! randomly generated workflows and assignment sequences.

#[cfg(test)]
mod tests {
    use crate::field::guard::TransitionGuard;
    use crate::field::model::Record;
    use crate::field::types::{StateValue, Workflow};
    use proptest::prelude::*;

    // ===== STRATEGY HELPERS =====

    /// A small alphabet of states so random edges actually connect
    fn any_state() -> impl Strategy<Value = StateValue> {
        (0i64..6).prop_map(StateValue::Integer)
    }

    /// Random workflow over the alphabet; targets may dangle
    fn any_workflow() -> impl Strategy<Value = Workflow> {
        prop::collection::btree_map(any_state(), prop::collection::btree_set(any_state(), 0..4), 0..6)
            .prop_map(|table| {
                table
                    .into_iter()
                    .fold(Workflow::new(), |wf, (from, to)| wf.state(from, to))
            })
    }

    fn guard_for(workflow: Workflow) -> TransitionGuard {
        TransitionGuard::integer_field("stage", workflow)
    }

    // ===== WRITE RULES =====

    proptest! {
        /// Property: a fresh subject accepts exactly the declared states
        #[test]
        fn test_first_write_iff_declared(workflow in any_workflow(), proposed in any_state()) {
            let guard = guard_for(workflow.clone());
            let mut record = Record::new("Ticket");

            let accepted = guard.write(&mut record, proposed.clone()).is_ok();
            prop_assert_eq!(accepted, workflow.contains_state(&proposed));
        }

        /// Property: from a set state, write succeeds iff the target is listed,
        /// and a failed write leaves the slot unchanged
        #[test]
        fn test_write_iff_permitted(
            workflow in any_workflow(),
            current in any_state(),
            proposed in any_state()
        ) {
            let guard = guard_for(workflow.clone());
            let mut record = Record::new("Ticket");
            record.hydrate("stage", current.clone());

            let permitted = workflow
                .targets(&current)
                .is_some_and(|targets| targets.contains(&proposed));

            match guard.write(&mut record, proposed.clone()) {
                Ok(()) => {
                    prop_assert!(permitted);
                    prop_assert_eq!(guard.read(&record), Some(proposed));
                }
                Err(err) => {
                    prop_assert!(!permitted);
                    prop_assert_eq!(err.current, Some(current.clone()));
                    prop_assert_eq!(err.proposed, proposed);
                    prop_assert_eq!(guard.read(&record), Some(current));
                }
            }
        }

        /// Property: every value ever stored is reachable under the workflow
        #[test]
        fn test_stored_history_follows_edges(
            workflow in any_workflow(),
            attempts in prop::collection::vec(any_state(), 0..20)
        ) {
            let guard = guard_for(workflow.clone());
            let mut record = Record::new("Ticket");
            let mut history: Vec<StateValue> = Vec::new();

            for proposed in attempts {
                if guard.write(&mut record, proposed.clone()).is_ok() {
                    history.push(proposed);
                }
            }

            if let Some(first) = history.first() {
                prop_assert!(workflow.contains_state(first));
            }
            for pair in history.windows(2) {
                prop_assert!(workflow.targets(&pair[0]).is_some_and(|t| t.contains(&pair[1])));
            }
        }
    }

    // ===== DESCRIBE ROUND-TRIP =====

    proptest! {
        /// Property: a guard rebuilt from its descriptor agrees on every pair
        #[test]
        fn test_descriptor_preserves_behaviour(workflow in any_workflow()) {
            let guard = guard_for(workflow);
            let json = guard.describe().to_json().unwrap();
            let descriptor = crate::field::descriptor::FieldDescriptor::from_json(&json).unwrap();
            let rebuilt = TransitionGuard::from_descriptor(&descriptor).unwrap();

            prop_assert_eq!(rebuilt.workflow(), guard.workflow());
            for current in (0i64..6).map(StateValue::Integer) {
                for proposed in (0i64..6).map(StateValue::Integer) {
                    prop_assert_eq!(
                        rebuilt.can_transition(Some(&current), &proposed),
                        guard.can_transition(Some(&current), &proposed)
                    );
                }
                prop_assert_eq!(
                    rebuilt.can_transition(None, &current),
                    guard.can_transition(None, &current)
                );
            }
        }

        /// Property: describe is a pure function of the configuration
        #[test]
        fn test_describe_is_deterministic(workflow in any_workflow()) {
            let guard = guard_for(workflow);
            prop_assert_eq!(guard.describe().to_json().unwrap(), guard.clone().describe().to_json().unwrap());
        }
    }
}
