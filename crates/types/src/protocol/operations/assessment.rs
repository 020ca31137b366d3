// Path: crates/types/src/protocol/operations/assessment.rs

use super::OperationPayload;
use crate::error::ValidationError;
use crate::protocol::base::{AccountName, ExternalId, TimePointSec};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One timed phase of an assessment stage (e.g. application, review).
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssessmentPhase {
    /// Domain-defined phase kind.
    pub kind: u16,
    /// Opening time.
    pub start_time: TimePointSec,
    /// Closing time, strictly after `start_time`.
    pub end_time: TimePointSec,
}

/// An ordered group of phases.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssessmentStage {
    /// At least one phase.
    pub phases: Vec<AssessmentPhase>,
}

/// Registers an assessment (a staged review process) under an external id.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAssessmentOperation {
    /// 160-bit id, unique across assessments.
    pub external_id: ExternalId,
    /// The owning account.
    pub creator: AccountName,
    /// At least one stage.
    pub stages: Vec<AssessmentStage>,
}

impl OperationPayload for CreateAssessmentOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.creator.validate()?;
        ensure!(!self.stages.is_empty(), "Assessment must have at least one stage");
        for (i, stage) in self.stages.iter().enumerate() {
            ensure!(!stage.phases.is_empty(), "Assessment stage {} has no phases", i);
            for phase in &stage.phases {
                ensure!(
                    phase.start_time < phase.end_time,
                    "Assessment phase must start before it ends (stage {}: {} >= {})",
                    i,
                    phase.start_time,
                    phase.end_time
                );
            }
        }
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(stages: Vec<AssessmentStage>) -> CreateAssessmentOperation {
        CreateAssessmentOperation {
            external_id: ExternalId::new("c".repeat(40)),
            creator: "alice".into(),
            stages,
        }
    }

    fn phase(start: u32, end: u32) -> AssessmentPhase {
        AssessmentPhase {
            kind: 1,
            start_time: TimePointSec(start),
            end_time: TimePointSec(end),
        }
    }

    #[test]
    fn stages_need_ordered_phases() {
        let ok = assessment(vec![AssessmentStage {
            phases: vec![phase(10, 20), phase(20, 30)],
        }]);
        assert!(ok.validate().is_ok());

        assert!(assessment(vec![]).validate().is_err());
        assert!(assessment(vec![AssessmentStage { phases: vec![] }])
            .validate()
            .is_err());
        assert!(assessment(vec![AssessmentStage {
            phases: vec![phase(20, 20)]
        }])
        .validate()
        .is_err());
    }
}
