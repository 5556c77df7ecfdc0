//! Canonical document-store paths.
//!
//! Every tool and the personalization pipeline address the store through
//! these helpers so the hierarchy lives in one place.

/// Patient profile (demographic, non-sensitive): `users/{patient_id}`.
pub fn patient_profile(patient_id: &str) -> String {
    format!("users/{patient_id}")
}

/// Full clinical record: `emr_records/{patient_id}`.
pub fn patient_emr(patient_id: &str) -> String {
    format!("emr_records/{patient_id}")
}

/// Append-only EMR log: `emr_records/{patient_id}/log`.
pub fn patient_emr_log(patient_id: &str) -> String {
    format!("emr_records/{patient_id}/log")
}

/// Trial root: `clinicalTrials/{trial_id}`.
pub fn trial(trial_id: &str) -> String {
    format!("clinicalTrials/{trial_id}")
}

/// All stages of a trial: `clinicalTrials/{trial_id}/stages`.
pub fn trial_stages(trial_id: &str) -> String {
    format!("clinicalTrials/{trial_id}/stages")
}

/// One stage: `clinicalTrials/{trial_id}/stages/{n}`.
pub fn trial_stage(trial_id: &str, stage_number: u32) -> String {
    format!("clinicalTrials/{trial_id}/stages/{stage_number}")
}

/// One stage's summary field.
pub fn trial_stage_summary(trial_id: &str, stage_number: u32) -> String {
    format!("clinicalTrials/{trial_id}/stages/{stage_number}/summary")
}

/// Enrollment collection root.
pub fn enrollments() -> &'static str {
    "enrollments"
}

/// One enrollment document: `enrollments/{enrollment_id}`.
pub fn enrollment(enrollment_id: &str) -> String {
    format!("enrollments/{enrollment_id}")
}

/// A checklist completion bit inside an enrollment. The item description
/// is a free-text key kept verbatim as the final path segment; callers
/// must reject descriptions containing `/` before building the path.
pub fn checklist_item(enrollment_id: &str, stage_number: u32, item_description: &str) -> String {
    format!("enrollments/{enrollment_id}/checklistProgress/stage{stage_number}/{item_description}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_store_layout() {
        assert_eq!(patient_profile("p1"), "users/p1");
        assert_eq!(patient_emr_log("p1"), "emr_records/p1/log");
        assert_eq!(trial_stage("htn-04", 2), "clinicalTrials/htn-04/stages/2");
        assert_eq!(
            checklist_item("e1", 1, "Fast for 12 hours"),
            "enrollments/e1/checklistProgress/stage1/Fast for 12 hours"
        );
    }
}
