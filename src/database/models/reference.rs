use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Static state/district/skill catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PredefinedSkill {
    pub state: String,
    pub district: String,
    pub skill: String,
    #[serde(default)]
    pub whats_new: Option<String>,
}

/// Search projection returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMatch {
    pub state: String,
    pub district: String,
    pub skill: String,
}

impl From<&PredefinedSkill> for SkillMatch {
    fn from(record: &PredefinedSkill) -> Self {
        Self {
            state: record.state.clone(),
            district: record.district.clone(),
            skill: record.skill.clone(),
        }
    }
}

/// Records whose state equals `state` ignoring case, in storage order.
pub fn search_by_state(records: &[PredefinedSkill], state: &str) -> Vec<SkillMatch> {
    let wanted = state.to_lowercase();
    records
        .iter()
        .filter(|r| r.state.to_lowercase() == wanted)
        .map(SkillMatch::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, district: &str, skill: &str) -> PredefinedSkill {
        PredefinedSkill {
            state: state.to_string(),
            district: district.to_string(),
            skill: skill.to_string(),
            whats_new: None,
        }
    }

    #[test]
    fn matches_ignore_case_and_keep_storage_order() {
        let records = vec![
            record("Telangana", "Warangal", "Cheriyal scroll painting"),
            record("Kerala", "Alappuzha", "Coir weaving"),
            record("TELANGANA", "Nirmal", "Nirmal toys"),
        ];

        let upper = search_by_state(&records, "Telangana");
        let lower = search_by_state(&records, "telangana");

        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 2);
        assert_eq!(upper[0].district, "Warangal");
        assert_eq!(upper[1].district, "Nirmal");
    }

    #[test]
    fn empty_state_matches_nothing_real() {
        let records = vec![record("Kerala", "Kollam", "Cashew processing")];
        assert!(search_by_state(&records, "").is_empty());
        assert!(search_by_state(&records, "Goa").is_empty());
    }
}
