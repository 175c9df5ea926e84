//! Offline roster checks: every username needs exactly one display name, and
//! avatars that nobody references are worth flagging.

use crate::dataset::Dataset;
use crate::directory::Directory;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing_display_names: Vec<String>,
    pub extra_display_names: Vec<String>,
    pub missing_avatars: Vec<String>,
    pub unreferenced_avatars: Vec<String>,
}

impl ValidationReport {
    pub fn check(dataset: &Dataset, directory: &Directory) -> Self {
        let mut report = Self::default();

        for (_, username) in dataset.members() {
            if directory.explicit_display_name(username).is_none() {
                report.missing_display_names.push(username.to_string());
            }
            if directory.avatar(username).is_none() {
                report.missing_avatars.push(username.to_string());
            }
        }

        report.extra_display_names = directory
            .display_names()
            .keys()
            .filter(|u| !dataset.contains(u))
            .cloned()
            .collect();
        report.unreferenced_avatars = directory
            .avatars()
            .keys()
            .filter(|u| !dataset.contains(u))
            .cloned()
            .collect();

        // Map iteration order is arbitrary.
        report.extra_display_names.sort_unstable();
        report.unreferenced_avatars.sort_unstable();
        report
    }

    /// Display names must match the dataset exactly; avatar gaps are only warnings.
    pub fn is_ok(&self) -> bool {
        self.missing_display_names.is_empty() && self.extra_display_names.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.missing_avatars.is_empty() || !self.unreferenced_avatars.is_empty()
    }
}
