use crate::model::entry::Status;

/// Signal a rule looks for.
enum Signal {
    Label(&'static str),
    LabelOrTitle(&'static str),
}

/// Evaluated top to bottom, first hit wins. Curated labels outrank the
/// free-text cancellation check on the title.
const RULES: &[(Signal, Status)] = &[
    (Signal::Label("auto-approved"), Status::AutoApproved),
    (Signal::Label("approved"), Status::Approved),
    (Signal::Label("denied"), Status::Denied),
    (Signal::LabelOrTitle("cancel"), Status::Cancelled),
];

impl Signal {
    fn matches(&self, labels: &[String], title_lower: &str) -> bool {
        match self {
            Signal::Label(name) => labels.iter().any(|l| l == name),
            Signal::LabelOrTitle(word) => {
                labels.iter().any(|l| l == word) || title_lower.contains(word)
            }
        }
    }
}

pub fn classify(labels: &[String], title: &str) -> Status {
    let title_lower = title.to_lowercase();
    RULES
        .iter()
        .find(|(signal, _)| signal.matches(labels, &title_lower))
        .map(|(_, status)| *status)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn auto_approved_outranks_denied() {
        assert_eq!(
            classify(&labels(&["auto-approved", "denied"]), "Exclusion"),
            Status::AutoApproved
        );
    }

    #[test]
    fn approved_outranks_cancel_in_title() {
        assert_eq!(
            classify(&labels(&["approved"]), "Cancel auto shutdown exclusion"),
            Status::Approved
        );
    }

    #[test]
    fn denied_label() {
        assert_eq!(classify(&labels(&["denied", "cancel"]), ""), Status::Denied);
    }

    #[test]
    fn cancel_from_title_without_labels() {
        assert_eq!(
            classify(&[], "Cancel auto shutdown exclusion"),
            Status::Cancelled
        );
    }

    #[test]
    fn cancel_label() {
        assert_eq!(classify(&labels(&["cancel"]), "Exclusion"), Status::Cancelled);
    }

    #[test]
    fn defaults_to_pending() {
        assert_eq!(classify(&labels(&["pending", "bug"]), "Exclusion"), Status::Pending);
        assert_eq!(classify(&[], ""), Status::Pending);
    }
}
