use crate::models::offday::{OffdayRecord, UserId};

/// The user a view is computed for. Passed explicitly to every view that
/// distinguishes "me" from everyone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub name: String,
    pub user_id: Option<UserId>,
}

impl Viewer {
    /// Looks `name` up in `records`. A name with no records still makes a
    /// valid viewer; it simply owns nothing.
    pub fn resolve(name: &str, records: &[OffdayRecord]) -> Self {
        let name = name.trim().to_string();
        let user_id = records
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.user_id);
        Self { name, user_id }
    }

    pub fn owns(&self, record: &OffdayRecord) -> bool {
        match self.user_id {
            Some(id) => record.user_id == id,
            None => record.name == self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn resolve_picks_up_user_id_by_name() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let records = vec![
            OffdayRecord::new(day, UserId(1), "Ko"),
            OffdayRecord::new(day, UserId(2), "Ahn"),
        ];
        let viewer = Viewer::resolve(" Ahn ", &records);
        assert_eq!(viewer.user_id, Some(UserId(2)));
        assert!(viewer.owns(&records[1]));
        assert!(!viewer.owns(&records[0]));

        let stranger = Viewer::resolve("Woo", &records);
        assert_eq!(stranger.user_id, None);
        assert!(!stranger.owns(&records[0]));
    }
}
